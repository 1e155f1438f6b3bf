//! The terrain scene system: spline meshes first, then vegetation

use rayon::ThreadPoolBuilder;
use strand_core::{EntityId, Result, StrandError};
use strand_spline::SplineMeshConfig;
use strand_vegetation::VegetationConfig;
use tracing::info;

use crate::spline_sync::SplineMeshProcessor;
use crate::system::{FrameContext, RuntimeSystem};
use crate::vegetation_sync::VegetationProcessor;

/// Owns every spline mesh and vegetation component of a scene
#[derive(Default)]
pub struct TerrainScene {
    splines: SplineMeshProcessor,
    vegetation: VegetationProcessor,
    frame: u64,
}

impl TerrainScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process vegetation layers on a dedicated pool of `threads` workers
    pub fn with_worker_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("strand-vegetation-{}", i))
            .build()
            .map_err(|e| StrandError::InvalidConfig(format!("worker pool: {}", e)))?;
        Ok(Self {
            vegetation: VegetationProcessor::with_pool(pool),
            ..Self::default()
        })
    }

    /// Add or replace a spline mesh component. Layers it blocks are rebuilt.
    pub fn add_spline(&mut self, entity: EntityId, name: impl Into<String>, config: SplineMeshConfig) {
        let name = name.into();
        if let Some(previous) = self.splines.name(entity).filter(|n| *n != name) {
            self.vegetation.mark_blocked_by(previous);
        }
        self.vegetation.mark_blocked_by(&name);
        self.splines.insert(entity, name, config);
    }

    pub fn remove_spline(&mut self, entity: EntityId) -> bool {
        if let Some(name) = self.splines.name(entity).map(str::to_owned) {
            self.vegetation.mark_blocked_by(&name);
        }
        self.splines.remove(entity)
    }

    /// Add or replace a vegetation component
    pub fn add_vegetation(&mut self, entity: EntityId, config: VegetationConfig) {
        self.vegetation.insert(entity, config);
    }

    pub fn remove_vegetation(&mut self, entity: EntityId) -> bool {
        self.vegetation.remove(entity)
    }

    /// Rebuild a vegetation layer from scratch on the next update
    pub fn mark_dirty(&mut self, entity: EntityId) -> bool {
        self.vegetation.mark_dirty(entity)
    }

    pub fn splines(&self) -> &SplineMeshProcessor {
        &self.splines
    }

    pub fn vegetation(&self) -> &VegetationProcessor {
        &self.vegetation
    }

    /// Frames processed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn tick(&mut self, ctx: &mut FrameContext<'_>) {
        self.splines.update(ctx.env, &mut *ctx.meshes);
        let snapshots = self.splines.snapshots();
        self.vegetation.update(ctx.env, &snapshots, &mut *ctx.instances);
        self.frame += 1;
    }
}

impl RuntimeSystem for TerrainScene {
    fn initialize(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        info!(
            splines = self.splines.len(),
            vegetation = self.vegetation.len(),
            "terrain scene initialized"
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>, _dt: f64) -> Result<()> {
        self.tick(ctx);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.splines.clear();
        self.vegetation.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "terrain_scene"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEnvironment, RecordingSink};
    use strand_core::Vec3;
    use strand_vegetation::DensityMask;

    struct Split {
        meshes: RecordingSink,
        instances: RecordingSink,
    }

    fn run_frame(scene: &mut TerrainScene, env: &MockEnvironment, out: &mut Split) {
        let mut ctx = FrameContext {
            env,
            meshes: &mut out.meshes,
            instances: &mut out.instances,
        };
        scene.update(&mut ctx, 1.0 / 60.0).unwrap();
    }

    fn setup() -> (TerrainScene, MockEnvironment) {
        let road = EntityId::from_raw(1);
        let grass = EntityId::from_raw(2);

        let mut env = MockEnvironment::flat(64.0);
        env.masks.insert("grass".into(), DensityMask::filled(64, 64, [255; 4]));
        env.splines.insert(
            road,
            vec![Vec3::new(-32.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(32.0, 0.0, 0.0)],
        );

        let mut scene = TerrainScene::new();
        scene.add_spline(
            road,
            "road",
            SplineMeshConfig {
                width: 6.0,
                material: Some("asphalt".into()),
                terrain: Some("flat".into()),
                ..Default::default()
            },
        );
        scene.add_vegetation(
            grass,
            VegetationConfig {
                terrain: Some("flat".into()),
                mask: Some("grass".into()),
                density: 0.5,
                blocking_splines: vec!["road".into()],
                ..Default::default()
            },
        );
        (scene, env)
    }

    #[test]
    fn frame_publishes_meshes_and_instances() {
        let (mut scene, env) = setup();
        let mut out = Split {
            meshes: RecordingSink::default(),
            instances: RecordingSink::default(),
        };

        let mut ctx = FrameContext {
            env: &env,
            meshes: &mut out.meshes,
            instances: &mut out.instances,
        };
        scene.initialize(&mut ctx).unwrap();
        run_frame(&mut scene, &env, &mut out);

        assert_eq!(scene.name(), "terrain_scene");
        assert_eq!(scene.frame(), 1);
        assert_eq!(out.meshes.uploads.len(), 1);
        let grass = EntityId::from_raw(2);
        assert!(!out.instances.matrices[&grass].is_empty());
        assert!(out.instances.matrices[&grass]
            .iter()
            .all(|m| !(-3.0..3.0).contains(&m.w_axis.z)));
    }

    #[test]
    fn removing_a_blocking_spline_rebuilds_the_layer() {
        let (mut scene, env) = setup();
        let mut out = Split {
            meshes: RecordingSink::default(),
            instances: RecordingSink::default(),
        };
        run_frame(&mut scene, &env, &mut out);

        let grass = EntityId::from_raw(2);
        assert_eq!(scene.vegetation().is_dirty(grass), Some(false));
        assert!(scene.remove_spline(EntityId::from_raw(1)));
        assert_eq!(scene.vegetation().is_dirty(grass), Some(true));

        run_frame(&mut scene, &env, &mut out);
        assert_eq!(out.meshes.cleared, vec![EntityId::from_raw(1)]);
        assert!(scene
            .vegetation()
            .pages(grass)
            .unwrap()
            .iter()
            .flat_map(|p| p.instances.iter())
            .any(|m| (-3.0..3.0).contains(&m.w_axis.z)));
    }

    #[test]
    fn renaming_a_blocking_spline_rebuilds_the_layer() {
        let (mut scene, env) = setup();
        let mut out = Split {
            meshes: RecordingSink::default(),
            instances: RecordingSink::default(),
        };
        run_frame(&mut scene, &env, &mut out);

        let road = EntityId::from_raw(1);
        let grass = EntityId::from_raw(2);
        let config = scene.splines().config(road).cloned().unwrap();
        scene.add_spline(road, "canal", config);
        assert_eq!(scene.vegetation().is_dirty(grass), Some(true));

        run_frame(&mut scene, &env, &mut out);
        assert_eq!(scene.vegetation().is_dirty(grass), Some(false));
        assert!(scene
            .vegetation()
            .pages(grass)
            .unwrap()
            .iter()
            .flat_map(|p| p.instances.iter())
            .any(|m| (-3.0..3.0).contains(&m.w_axis.z)));
    }

    #[test]
    fn dedicated_workers_and_shutdown() {
        let (_, env) = setup();
        let mut scene = TerrainScene::with_worker_threads(2).unwrap();
        scene.add_vegetation(
            EntityId::from_raw(3),
            VegetationConfig {
                terrain: Some("flat".into()),
                mask: Some("grass".into()),
                ..Default::default()
            },
        );
        let mut out = Split {
            meshes: RecordingSink::default(),
            instances: RecordingSink::default(),
        };
        run_frame(&mut scene, &env, &mut out);
        assert!(scene.vegetation().pages(EntityId::from_raw(3)).is_some());

        scene.shutdown().unwrap();
        assert!(scene.vegetation().is_empty());
        assert!(scene.splines().is_empty());
    }
}
