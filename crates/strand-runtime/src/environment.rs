//! Capabilities the processors consume, and the sinks they publish to

use glam::Mat4;
use strand_core::{EntityId, Result, Vec3};
use strand_spline::{MeshBounds, RibbonMesh, RibbonVertex};
use strand_terrain::TerrainSampler;
use strand_vegetation::DensityMask;

/// Read-only view of the host engine, shared by every worker task.
pub trait Environment: Sync {
    /// Position of the active camera, if there is one
    fn camera_position(&self) -> Option<Vec3>;

    /// Terrain registered under `name`
    fn terrain(&self, name: &str) -> Option<&dyn TerrainSampler>;

    /// Control points of a spline entity, in order. Empty if unknown.
    fn control_points(&self, entity: EntityId) -> Vec<Vec3>;

    /// Decode the pixels of a mask asset.
    ///
    /// May fail with `StrandError::ResourceNotReady` while the asset is still
    /// loading; the caller retries on a later tick.
    fn load_mask(&self, name: &str) -> Result<DensityMask>;
}

/// Receives spline meshes. Called from the updating thread only.
pub trait MeshSink {
    fn upload(&mut self, entity: EntityId, mesh: &MeshData);
    fn clear(&mut self, entity: EntityId);
}

/// Receives vegetation instance transforms. Called from the updating thread only.
pub trait InstanceSink {
    fn update_world_matrices(&mut self, entity: EntityId, matrices: &[Mat4]);
}

/// A triangle-list mesh ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<RibbonVertex>,
    pub indices: Vec<u32>,
    pub bounds: Option<MeshBounds>,
    pub cast_shadows: bool,
}

impl MeshData {
    pub fn from_ribbon(ribbon: RibbonMesh, cast_shadows: bool) -> Self {
        let bounds = ribbon.bounds();
        Self {
            vertices: ribbon.vertices,
            indices: ribbon.indices,
            bounds,
            cast_shadows,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Byte distance between consecutive vertices
    pub fn stride(&self) -> usize {
        RibbonVertex::STRIDE
    }

    /// Raw vertex bytes in the layout described by `RibbonVertex::LAYOUT`
    pub fn vertex_bytes(&self) -> &[u8] {
        RibbonVertex::as_bytes(&self.vertices)
    }
}
