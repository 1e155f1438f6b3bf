//! `*.scene.toml` loading and the file-backed environment

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use strand_core::spline::{catmull_rom, segment_controls};
use strand_core::{EntityId, StrandError, Vec3};
use strand_runtime::{Environment, TerrainScene};
use strand_spline::SplineMeshConfig;
use strand_terrain::{FlatTerrain, Heightmap, TerrainSampler};
use strand_vegetation::{DensityMask, VegetationConfig};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub terrain: TerrainDef,
    #[serde(default)]
    pub camera: CameraDef,
    /// Mask name -> image path
    #[serde(default)]
    pub masks: BTreeMap<String, String>,
    #[serde(default)]
    pub splines: Vec<SplineDef>,
    #[serde(default)]
    pub vegetation: Vec<VegetationDef>,
}

#[derive(Debug, Deserialize)]
pub struct TerrainDef {
    pub name: String,
    /// 16-bit grayscale PNG; a flat terrain is used without one
    pub heightmap: Option<String>,
    pub size: f32,
    #[serde(default)]
    pub height_range: f32,
    /// Height of the flat terrain
    #[serde(default)]
    pub height: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CameraDef {
    #[serde(default)]
    pub path: Vec<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
pub struct SplineDef {
    pub name: String,
    pub points: Vec<[f32; 3]>,
    #[serde(default)]
    pub mesh: SplineMeshConfig,
}

#[derive(Debug, Deserialize)]
pub struct VegetationDef {
    pub name: String,
    #[serde(default)]
    pub layer: VegetationConfig,
}

impl SceneFile {
    pub fn parse(source: &str) -> Result<Self> {
        let scene: SceneFile = toml::from_str(source).context("invalid scene file")?;
        if !(scene.terrain.size > 0.0) {
            bail!("terrain size must be positive, got {}", scene.terrain.size);
        }
        Ok(scene)
    }
}

/// Serves terrain, control points, and mask images from disk
pub struct FileEnvironment {
    terrain_name: String,
    terrain: Box<dyn TerrainSampler>,
    splines: HashMap<EntityId, Vec<Vec3>>,
    masks: BTreeMap<String, PathBuf>,
    camera: Option<Vec3>,
}

impl FileEnvironment {
    pub fn set_camera(&mut self, camera: Option<Vec3>) {
        self.camera = camera;
    }

    pub fn terrain_sampler(&self) -> &dyn TerrainSampler {
        self.terrain.as_ref()
    }
}

impl Environment for FileEnvironment {
    fn camera_position(&self) -> Option<Vec3> {
        self.camera
    }

    fn terrain(&self, name: &str) -> Option<&dyn TerrainSampler> {
        (name == self.terrain_name).then(|| self.terrain.as_ref())
    }

    fn control_points(&self, entity: EntityId) -> Vec<Vec3> {
        self.splines.get(&entity).cloned().unwrap_or_default()
    }

    fn load_mask(&self, name: &str) -> strand_core::Result<DensityMask> {
        let path = self
            .masks
            .get(name)
            .ok_or_else(|| StrandError::MissingResource(format!("mask '{}'", name)))?;
        DensityMask::open(path)
    }
}

/// A scene file resolved against its directory
pub struct LoadedScene {
    pub env: FileEnvironment,
    pub splines: Vec<(EntityId, String, SplineMeshConfig)>,
    pub vegetation: Vec<(EntityId, String, VegetationConfig)>,
    pub camera_path: Vec<Vec3>,
}

impl LoadedScene {
    pub fn load(path: &str) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene '{}'", path))?;
        let base = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
        Self::from_file(SceneFile::parse(&source)?, base)
    }

    pub fn from_file(file: SceneFile, base: &Path) -> Result<Self> {
        let def = &file.terrain;
        let terrain: Box<dyn TerrainSampler> = match &def.heightmap {
            Some(heightmap) => {
                let path = base.join(heightmap);
                let hm = Heightmap::from_png(&path, def.size, def.height_range)
                    .with_context(|| format!("failed to load heightmap '{}'", path.display()))?;
                info!(width = hm.width, depth = hm.depth, "loaded heightmap");
                Box::new(hm)
            }
            None => Box::new(FlatTerrain::new(def.size, def.height)),
        };

        let mut spline_points: HashMap<EntityId, Vec<Vec3>> = HashMap::new();
        let mut splines = Vec::new();
        for spline in file.splines {
            let id = EntityId::new();
            spline_points.insert(id, spline.points.into_iter().map(Vec3::from_array).collect());
            splines.push((id, spline.name, spline.mesh));
        }

        let vegetation = file
            .vegetation
            .into_iter()
            .map(|v| (EntityId::new(), v.name, v.layer))
            .collect();

        let masks = file
            .masks
            .into_iter()
            .map(|(name, rel)| (name, base.join(rel)))
            .collect();

        let camera_path: Vec<Vec3> = file.camera.path.into_iter().map(Vec3::from_array).collect();

        Ok(Self {
            env: FileEnvironment {
                terrain_name: file.terrain.name,
                terrain,
                splines: spline_points,
                masks,
                camera: camera_path.first().copied(),
            },
            splines,
            vegetation,
            camera_path,
        })
    }

    /// Register every component with a fresh scene system
    pub fn build_scene(&self, threads: Option<usize>) -> Result<TerrainScene> {
        let mut scene = match threads {
            Some(n) => TerrainScene::with_worker_threads(n)?,
            None => TerrainScene::new(),
        };
        for (id, name, config) in &self.splines {
            scene.add_spline(*id, name.clone(), config.clone());
        }
        for (id, _, config) in &self.vegetation {
            scene.add_vegetation(*id, config.clone());
        }
        Ok(scene)
    }

    pub fn spline_points(&self, entity: EntityId) -> Vec<Vec3> {
        self.env.control_points(entity)
    }
}

/// Camera position at `frame` of `frames`, moving along a Catmull-Rom path
pub fn camera_at(path: &[Vec3], frame: usize, frames: usize) -> Option<Vec3> {
    match path.len() {
        0 => None,
        1 => Some(path[0]),
        n => {
            let progress = if frames > 1 {
                frame as f32 / (frames - 1) as f32
            } else {
                0.0
            };
            let along = progress.clamp(0.0, 1.0) * (n - 1) as f32;
            let segment = (along as usize).min(n - 2);
            let [p0, p1, p2, p3] = segment_controls(path, segment);
            Some(catmull_rom(p0, p1, p2, p3, along - segment as f32))
        }
    }
}
