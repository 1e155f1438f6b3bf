//! CLI command implementations

pub mod run;
pub mod scatter;
pub mod spline;

use std::collections::BTreeMap;

use glam::Mat4;
use strand_core::EntityId;
use strand_runtime::{InstanceSink, MeshData, MeshSink};

/// Vertex and index counts of the meshes currently published
#[derive(Default)]
pub struct MeshStats {
    pub meshes: BTreeMap<EntityId, (usize, usize)>,
    pub uploads: usize,
}

impl MeshSink for MeshStats {
    fn upload(&mut self, entity: EntityId, mesh: &MeshData) {
        self.meshes
            .insert(entity, (mesh.vertex_count(), mesh.index_count()));
        self.uploads += 1;
    }

    fn clear(&mut self, entity: EntityId) {
        self.meshes.remove(&entity);
    }
}

/// Visible instance count per vegetation layer
#[derive(Default)]
pub struct InstanceStats {
    pub visible: BTreeMap<EntityId, usize>,
}

impl InstanceStats {
    pub fn total(&self) -> usize {
        self.visible.values().sum()
    }
}

impl InstanceSink for InstanceStats {
    fn update_world_matrices(&mut self, entity: EntityId, matrices: &[Mat4]) {
        self.visible.insert(entity, matrices.len());
    }
}
