//! Per-entity vegetation state: mask cache, page cache, visible transforms

use std::collections::BTreeMap;

use glam::Mat4;
use rayon::prelude::*;
use rayon::ThreadPool;
use strand_core::{EntityId, Result, StrandError};
use strand_terrain::TerrainSampler;
use strand_vegetation::{
    build_pages, carve_ribbon, cull_pages, DensityMask, VegetationConfig, VegetationPage,
};
use tracing::{debug, info, warn};

use crate::environment::{Environment, InstanceSink};
use crate::spline_sync::SplineSnapshot;

/// Render data owned by one vegetation entity
#[derive(Default)]
struct VegetationState {
    config: VegetationConfig,
    dirty: bool,
    /// Mask name the cached source mask was loaded from
    mask_source: Option<String>,
    /// Mask pixels as loaded, before any exclusion carving
    source_mask: Option<DensityMask>,
    pages: Option<Vec<VegetationPage>>,
    transforms: Vec<Mat4>,
    /// Last hard failure, reported once until it changes
    last_error: Option<String>,
}

impl VegetationState {
    fn new(config: VegetationConfig) -> Self {
        Self {
            config,
            dirty: true,
            ..Default::default()
        }
    }

    fn dispose(&mut self) {
        self.source_mask = None;
        self.mask_source = None;
        self.pages = None;
        self.transforms.clear();
    }

    fn needs_rebuild(&self) -> bool {
        self.dirty
            || self.pages.is_none()
            || self.source_mask.is_none()
            || self.mask_source != self.config.mask
    }
}

/// What a tick did to one entity
#[derive(Debug)]
enum TickOutcome {
    /// Transforms were recomputed and should be published
    Updated,
    /// A dependency was not ready; cached pages were culled, nothing rebuilt
    Deferred(StrandError),
    /// The layer cannot be shown; transforms were cleared
    Failed { error: StrandError, repeated: bool },
}

/// Shared read-only inputs of one vegetation tick
struct TickInputs<'a> {
    env: &'a dyn Environment,
    splines: &'a BTreeMap<String, SplineSnapshot>,
}

/// Vegetation layers keyed by entity, processed one worker task per entity
#[derive(Default)]
pub struct VegetationProcessor {
    states: BTreeMap<EntityId, VegetationState>,
    removed: Vec<EntityId>,
    pool: Option<ThreadPool>,
}

impl VegetationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run entity tasks on a dedicated pool instead of the global rayon pool
    pub fn with_pool(pool: ThreadPool) -> Self {
        Self {
            pool: Some(pool),
            ..Self::default()
        }
    }

    /// Register a layer, or replace its config and schedule a full rebuild
    pub fn insert(&mut self, entity: EntityId, config: VegetationConfig) {
        match self.states.get_mut(&entity) {
            Some(state) => {
                state.config = config;
                state.dirty = true;
            }
            None => {
                self.states.insert(entity, VegetationState::new(config));
            }
        }
        self.removed.retain(|id| *id != entity);
    }

    pub fn remove(&mut self, entity: EntityId) -> bool {
        let existed = self.states.remove(&entity).is_some();
        if existed {
            self.removed.push(entity);
        }
        existed
    }

    /// Force pages (and the carved mask) to be rebuilt on the next update
    pub fn mark_dirty(&mut self, entity: EntityId) -> bool {
        match self.states.get_mut(&entity) {
            Some(state) => {
                state.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Mark every layer blocked by the named spline dirty
    pub fn mark_blocked_by(&mut self, spline_name: &str) {
        for state in self.states.values_mut() {
            if state.config.blocking_splines.iter().any(|n| n == spline_name) {
                state.dirty = true;
            }
        }
    }

    pub fn config(&self, entity: EntityId) -> Option<&VegetationConfig> {
        self.states.get(&entity).map(|s| &s.config)
    }

    pub fn pages(&self, entity: EntityId) -> Option<&[VegetationPage]> {
        self.states.get(&entity).and_then(|s| s.pages.as_deref())
    }

    /// Transforms published for `entity` on the last update
    pub fn transforms(&self, entity: EntityId) -> Option<&[Mat4]> {
        self.states.get(&entity).map(|s| s.transforms.as_slice())
    }

    pub fn is_dirty(&self, entity: EntityId) -> Option<bool> {
        self.states.get(&entity).map(|s| s.dirty)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Rebuild and cull every layer in parallel, then publish in entity order.
    pub fn update(
        &mut self,
        env: &dyn Environment,
        splines: &BTreeMap<String, SplineSnapshot>,
        sink: &mut dyn InstanceSink,
    ) {
        for entity in self.removed.drain(..) {
            debug!(entity = %entity, "disposing removed vegetation layer");
            sink.update_world_matrices(entity, &[]);
        }

        let inputs = TickInputs { env, splines };
        let states = &mut self.states;
        let mut run = || -> Vec<(EntityId, TickOutcome)> {
            states
                .par_iter_mut()
                .map(|(entity, state)| (*entity, tick_entity(&inputs, *entity, state)))
                .collect()
        };
        let outcomes = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        for (entity, outcome) in outcomes {
            let Some(state) = self.states.get(&entity) else {
                continue;
            };
            match outcome {
                TickOutcome::Updated => sink.update_world_matrices(entity, &state.transforms),
                TickOutcome::Deferred(err) => {
                    debug!(entity = %entity, reason = %err, "vegetation rebuild deferred");
                    if state.pages.is_some() {
                        sink.update_world_matrices(entity, &state.transforms);
                    }
                }
                TickOutcome::Failed { error, repeated } => {
                    if !repeated {
                        warn!(entity = %entity, error = %error, "vegetation layer failed");
                        sink.update_world_matrices(entity, &[]);
                    }
                }
            }
        }
    }

    /// Dispose every layer without publishing
    pub fn clear(&mut self) {
        self.states.clear();
        self.removed.clear();
    }
}

fn tick_entity(inputs: &TickInputs<'_>, entity: EntityId, state: &mut VegetationState) -> TickOutcome {
    match try_tick(inputs, entity, state) {
        Ok(()) => {
            state.last_error = None;
            TickOutcome::Updated
        }
        Err(err) if err.is_transient() => TickOutcome::Deferred(err),
        Err(err) => {
            state.dispose();
            let message = err.to_string();
            let repeated = state.last_error.as_deref() == Some(message.as_str());
            state.last_error = Some(message);
            TickOutcome::Failed {
                error: err,
                repeated,
            }
        }
    }
}

/// mask -> pages -> cull, strictly in that order
fn try_tick(inputs: &TickInputs<'_>, entity: EntityId, state: &mut VegetationState) -> Result<()> {
    state.config.validate()?;

    let terrain_name = state.config.terrain.as_deref().ok_or_else(|| {
        StrandError::InvalidConfig(format!("vegetation {} has no terrain", entity))
    })?;
    let terrain = inputs
        .env
        .terrain(terrain_name)
        .ok_or_else(|| StrandError::TerrainNotFound(terrain_name.to_string()))?;

    // A rebuild waiting on its mask still culls the pages it already has
    let rebuilt = if state.needs_rebuild() {
        rebuild(inputs, entity, state, terrain)
    } else {
        Ok(())
    };
    if let Err(err) = &rebuilt {
        if !err.is_transient() {
            return rebuilt;
        }
    }

    let pages = state.pages.as_deref().unwrap_or_default();
    match inputs.env.camera_position() {
        Some(camera) => cull_pages(pages, camera, &state.config.cull_params(), &mut state.transforms),
        None => state.transforms.clear(),
    }
    rebuilt
}

fn rebuild(
    inputs: &TickInputs<'_>,
    entity: EntityId,
    state: &mut VegetationState,
    terrain: &dyn TerrainSampler,
) -> Result<()> {
    if state.source_mask.is_none() || state.mask_source != state.config.mask {
        let name = state.config.mask.as_deref().ok_or_else(|| {
            StrandError::InvalidConfig(format!("vegetation {} has no density mask", entity))
        })?;
        let mask = inputs.env.load_mask(name)?;
        debug!(
            entity = %entity,
            width = mask.width(),
            height = mask.height(),
            "loaded density mask"
        );
        state.source_mask = Some(mask);
        state.mask_source = state.config.mask.clone();
    }

    let Some(source) = state.source_mask.as_ref() else {
        return Err(StrandError::ResourceNotReady(format!(
            "density mask for vegetation {}",
            entity
        )));
    };

    let channel = state.config.mask_channel;
    let mut mask = source.clone();
    for name in &state.config.blocking_splines {
        let Some(spline) = inputs.splines.get(name) else {
            debug!(entity = %entity, spline = %name, "blocking spline not found");
            continue;
        };
        let ribbon = spline.build(inputs.env);
        let carved = carve_ribbon(&mut mask, channel, terrain.size(), &ribbon);
        debug!(entity = %entity, spline = %name, pixels = carved, "carved blocking spline");
    }

    let pages = build_pages(terrain, &mask, channel, &state.config.scatter_params());
    info!(
        entity = %entity,
        pages = pages.len(),
        instances = pages.iter().map(|p| p.instances.len()).sum::<usize>(),
        "rebuilt vegetation pages"
    );
    state.pages = Some(pages);
    state.dirty = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEnvironment, RecordingSink};
    use strand_core::Vec3;

    fn grass() -> VegetationConfig {
        VegetationConfig {
            terrain: Some("flat".into()),
            mask: Some("grass".into()),
            density: 0.5,
            seed: 11,
            view_distance: 40.0,
            ..Default::default()
        }
    }

    fn env_with_mask() -> MockEnvironment {
        let mut env = MockEnvironment::flat(64.0);
        env.masks.insert("grass".into(), DensityMask::filled(64, 64, [255; 4]));
        env
    }

    #[test]
    fn builds_once_then_only_culls() {
        let id = EntityId::from_raw(1);
        let env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());

        processor.update(&env, &BTreeMap::new(), &mut sink);
        let first_pages = processor.pages(id).unwrap().to_vec();
        assert_eq!(first_pages.len(), 16);
        assert!(!sink.matrices[&id].is_empty());
        assert_eq!(processor.is_dirty(id), Some(false));

        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(env.mask_loads(), 1);
        assert_eq!(processor.pages(id).unwrap(), first_pages.as_slice());
        assert_eq!(sink.publishes, 2);
    }

    #[test]
    fn mark_dirty_rebuilds_identically() {
        let id = EntityId::from_raw(2);
        let env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);
        let before = processor.pages(id).unwrap().to_vec();

        assert!(processor.mark_dirty(id));
        assert!(!processor.mark_dirty(EntityId::from_raw(99)));
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(processor.pages(id).unwrap(), before.as_slice());
        // Mask is cached across dirty rebuilds
        assert_eq!(env.mask_loads(), 1);
    }

    #[test]
    fn changing_mask_reference_reloads_mask() {
        let id = EntityId::from_raw(3);
        let mut env = env_with_mask();
        env.masks.insert("bare".into(), DensityMask::filled(64, 64, [0; 4]));

        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);

        processor.insert(
            id,
            VegetationConfig {
                mask: Some("bare".into()),
                ..grass()
            },
        );
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(env.mask_loads(), 2);
        assert!(processor.pages(id).unwrap().iter().all(|p| p.is_empty()));
        assert!(sink.matrices[&id].is_empty());
    }

    #[test]
    fn unready_mask_defers_without_building() {
        let id = EntityId::from_raw(4);
        let mut env = env_with_mask();
        env.pending_masks.insert("grass".into());

        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);

        assert!(processor.pages(id).is_none());
        assert_eq!(processor.is_dirty(id), Some(true));
        assert_eq!(sink.publishes, 0);

        env.pending_masks.clear();
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(processor.pages(id).is_some());
        assert_eq!(sink.publishes, 1);
    }

    #[test]
    fn deferred_rebuild_still_culls_cached_pages() {
        let id = EntityId::from_raw(12);
        let mut env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(!sink.matrices[&id].is_empty());
        let cached = processor.pages(id).unwrap().to_vec();

        // Rebuild blocked on the mask while the camera leaves the terrain
        processor.mark_dirty(id);
        env.pending_masks.insert("grass".into());
        env.camera = Some(Vec3::new(1000.0, 2.0, 0.0));
        processor.update(&env, &BTreeMap::new(), &mut sink);

        assert_eq!(processor.is_dirty(id), Some(true));
        assert_eq!(processor.pages(id).unwrap(), cached.as_slice());
        assert_eq!(sink.publishes, 2);
        assert!(sink.matrices[&id].is_empty());

        // Back at the origin the cached pages show again
        env.camera = Some(Vec3::new(0.0, 2.0, 0.0));
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(sink.publishes, 3);
        assert!(!sink.matrices[&id].is_empty());
        assert_eq!(env.mask_loads(), 1);
    }

    #[test]
    fn failing_layer_does_not_affect_siblings() {
        let good = EntityId::from_raw(5);
        let bad = EntityId::from_raw(6);
        let env = env_with_mask();

        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(good, grass());
        processor.insert(
            bad,
            VegetationConfig {
                terrain: Some("missing".into()),
                ..grass()
            },
        );
        processor.update(&env, &BTreeMap::new(), &mut sink);

        assert!(!sink.matrices[&good].is_empty());
        assert!(sink.matrices[&bad].is_empty());
        assert!(processor.pages(bad).is_none());
    }

    #[test]
    fn repeated_failure_is_published_once() {
        let id = EntityId::from_raw(12);
        let env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(
            id,
            VegetationConfig {
                terrain: None,
                ..grass()
            },
        );
        processor.update(&env, &BTreeMap::new(), &mut sink);
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(sink.publishes, 1);

        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(!sink.matrices[&id].is_empty());
    }

    #[test]
    fn no_camera_clears_transforms_but_keeps_pages() {
        let id = EntityId::from_raw(7);
        let mut env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(!processor.transforms(id).unwrap().is_empty());

        env.camera = None;
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(processor.transforms(id).unwrap().is_empty());
        assert!(sink.matrices[&id].is_empty());
        assert!(processor.pages(id).is_some());
    }

    #[test]
    fn blocking_spline_carves_pages() {
        let id = EntityId::from_raw(8);
        let road = EntityId::from_raw(100);
        let mut env = env_with_mask();
        env.splines.insert(
            road,
            vec![Vec3::new(-32.0, 0.0, 0.0), Vec3::new(32.0, 0.0, 0.0)],
        );

        let mut splines = BTreeMap::new();
        splines.insert(
            "road".to_string(),
            SplineSnapshot {
                entity: road,
                config: strand_spline::SplineMeshConfig {
                    width: 8.0,
                    ..Default::default()
                },
            },
        );

        let mut processor = VegetationProcessor::new();
        processor.insert(
            id,
            VegetationConfig {
                blocking_splines: vec!["road".into()],
                ..grass()
            },
        );
        let mut sink = RecordingSink::default();
        processor.update(&env, &splines, &mut sink);

        let instances: Vec<&Mat4> = processor
            .pages(id)
            .unwrap()
            .iter()
            .flat_map(|p| p.instances.iter())
            .collect();
        assert!(!instances.is_empty());
        // The 8 unit wide road clears pixel rows 28..36 of the mask
        assert!(instances.iter().all(|m| !(-4.0..4.0).contains(&m.w_axis.z)));

        // Without the blocker, some instances land on the road
        processor.insert(id, grass());
        processor.update(&env, &splines, &mut sink);
        assert!(processor
            .pages(id)
            .unwrap()
            .iter()
            .flat_map(|p| p.instances.iter())
            .any(|m| (-4.0..0.0).contains(&m.w_axis.z)));
    }

    #[test]
    fn removal_publishes_empty_list() {
        let id = EntityId::from_raw(9);
        let env = env_with_mask();
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(id, grass());
        processor.update(&env, &BTreeMap::new(), &mut sink);

        assert!(processor.remove(id));
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert!(sink.matrices[&id].is_empty());
        assert!(processor.is_empty());
    }

    #[test]
    fn layer_without_mask_renders_nothing() {
        let id = EntityId::from_raw(10);
        let env = MockEnvironment::flat(64.0);
        let mut sink = RecordingSink::default();
        let mut processor = VegetationProcessor::new();
        processor.insert(
            id,
            VegetationConfig {
                mask: None,
                ..grass()
            },
        );
        processor.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(env.mask_loads(), 0);
        assert!(processor.pages(id).is_none());
        assert!(sink.matrices[&id].is_empty());
    }

    #[test]
    fn dedicated_pool_gives_same_result() {
        let id = EntityId::from_raw(11);
        let env = env_with_mask();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();

        let mut a = VegetationProcessor::with_pool(pool);
        let mut b = VegetationProcessor::new();
        a.insert(id, grass());
        b.insert(id, grass());

        let mut sink = RecordingSink::default();
        a.update(&env, &BTreeMap::new(), &mut sink);
        b.update(&env, &BTreeMap::new(), &mut sink);
        assert_eq!(a.pages(id), b.pages(id));
        assert_eq!(a.transforms(id), b.transforms(id));
    }
}
