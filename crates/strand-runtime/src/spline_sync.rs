//! Keeps `spline_mesh` components and their published meshes in step

use std::collections::BTreeMap;

use strand_core::{EntityId, Result, StrandError};
use strand_spline::{generate_spline_mesh, RibbonMesh, SplineMeshConfig};
use tracing::{debug, warn};

use crate::environment::{Environment, MeshData, MeshSink};

/// Render data owned by one spline entity: the mesh last published for it
#[derive(Debug, Clone, PartialEq)]
pub struct SplineRenderData {
    pub mesh: MeshData,
}

struct SplineEntry {
    name: String,
    config: SplineMeshConfig,
    render: Option<SplineRenderData>,
}

/// Name, config, and id of a spline, used to rebuild it as a blocker
#[derive(Debug, Clone)]
pub struct SplineSnapshot {
    pub entity: EntityId,
    pub config: SplineMeshConfig,
}

impl SplineSnapshot {
    /// Build the ribbon with this spline's own config and terrain
    pub fn build(&self, env: &dyn Environment) -> RibbonMesh {
        let points = env.control_points(self.entity);
        let terrain = self.config.terrain.as_deref().and_then(|name| env.terrain(name));
        generate_spline_mesh(&points, &self.config, terrain)
    }
}

/// Per-entity spline mesh state
#[derive(Default)]
pub struct SplineMeshProcessor {
    entries: BTreeMap<EntityId, SplineEntry>,
    /// Entities removed since the last update whose mesh must be cleared
    removed: Vec<EntityId>,
}

impl SplineMeshProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a spline component
    pub fn insert(&mut self, entity: EntityId, name: impl Into<String>, config: SplineMeshConfig) {
        let name = name.into();
        match self.entries.get_mut(&entity) {
            Some(entry) => {
                entry.name = name;
                entry.config = config;
            }
            None => {
                self.entries.insert(
                    entity,
                    SplineEntry {
                        name,
                        config,
                        render: None,
                    },
                );
            }
        }
        self.removed.retain(|id| *id != entity);
    }

    /// Drop a spline component; its render data is disposed on the next update
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let existed = self.entries.remove(&entity).is_some();
        if existed {
            self.removed.push(entity);
        }
        existed
    }

    pub fn config(&self, entity: EntityId) -> Option<&SplineMeshConfig> {
        self.entries.get(&entity).map(|e| &e.config)
    }

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entries.get(&entity).map(|e| e.name.as_str())
    }

    pub fn render_data(&self, entity: EntityId) -> Option<&SplineRenderData> {
        self.entries.get(&entity).and_then(|e| e.render.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a spline by component name
    pub fn find(&self, name: &str) -> Option<SplineSnapshot> {
        self.entries
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(id, e)| SplineSnapshot {
                entity: *id,
                config: e.config.clone(),
            })
    }

    /// Snapshot every spline by name
    pub fn snapshots(&self) -> BTreeMap<String, SplineSnapshot> {
        self.entries
            .iter()
            .map(|(id, e)| {
                (
                    e.name.clone(),
                    SplineSnapshot {
                        entity: *id,
                        config: e.config.clone(),
                    },
                )
            })
            .collect()
    }

    /// Regenerate every spline mesh and publish the ones that changed.
    pub fn update(&mut self, env: &dyn Environment, sink: &mut dyn MeshSink) {
        for entity in self.removed.drain(..) {
            debug!(entity = %entity, "disposing removed spline mesh");
            sink.clear(entity);
        }

        for (entity, entry) in self.entries.iter_mut() {
            match build_mesh(env, *entity, &entry.config) {
                Ok(mesh) => {
                    let changed = entry.render.as_ref().map_or(true, |r| r.mesh != mesh);
                    if changed {
                        debug!(
                            entity = %entity,
                            vertices = mesh.vertex_count(),
                            indices = mesh.index_count(),
                            "uploading spline mesh"
                        );
                        sink.upload(*entity, &mesh);
                        entry.render = Some(SplineRenderData { mesh });
                    }
                }
                Err(err) => {
                    if entry.render.take().is_some() {
                        warn!(entity = %entity, error = %err, "spline mesh disabled");
                        sink.clear(*entity);
                    }
                }
            }
        }
    }

    /// Dispose all render data without publishing
    pub fn clear(&mut self) {
        self.entries.clear();
        self.removed.clear();
    }
}

fn build_mesh(env: &dyn Environment, entity: EntityId, config: &SplineMeshConfig) -> Result<MeshData> {
    if config.material.is_none() {
        return Err(StrandError::MissingResource(format!(
            "spline {} has no material",
            entity
        )));
    }
    if !(config.width > 0.0) || !(config.segment_length > 0.0) {
        return Err(StrandError::InvalidConfig(format!(
            "spline {} needs a positive width and segment length",
            entity
        )));
    }

    let points = env.control_points(entity);
    if points.len() < 2 {
        return Err(StrandError::InvalidConfig(format!(
            "spline {} has {} control points, needs at least 2",
            entity,
            points.len()
        )));
    }

    let terrain = match config.terrain.as_deref() {
        Some(name) => Some(
            env.terrain(name)
                .ok_or_else(|| StrandError::TerrainNotFound(name.to_string()))?,
        ),
        None => None,
    };

    let ribbon = generate_spline_mesh(&points, config, terrain);
    if ribbon.is_empty() {
        return Err(StrandError::InvalidConfig(format!(
            "spline {} produced an empty mesh",
            entity
        )));
    }
    Ok(MeshData::from_ribbon(ribbon, config.cast_shadows))
}
