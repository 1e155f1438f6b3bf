//! Strand Spline - Terrain-following ribbon meshes
//!
//! Turns a chain of control points into a flat ribbon:
//! 1. `resample` walks the Catmull-Rom curve and emits points spaced
//!    `segment_length` apart.
//! 2. `build_ribbon` extrudes the points sideways into a triangle list,
//!    optionally snapping every vertex to a terrain sampler.
//!
//! Outputs raw vertex/index data for the renderer to consume.

pub mod bounds;
pub mod config;
pub mod resample;
pub mod ribbon;
pub mod vertex;

pub use bounds::{BoundingBox, BoundingSphere, MeshBounds};
pub use config::SplineMeshConfig;
pub use resample::resample;
pub use ribbon::{build_ribbon, RibbonMesh, RibbonParams};
pub use vertex::{RibbonVertex, VertexElement, VertexFormat};

use strand_core::Vec3;
use strand_terrain::TerrainSampler;

/// Resample `control_points` and build the ribbon described by `config`.
pub fn generate_spline_mesh(
    control_points: &[Vec3],
    config: &SplineMeshConfig,
    terrain: Option<&dyn TerrainSampler>,
) -> RibbonMesh {
    let points = resample(control_points, config.segment_length);
    build_ribbon(&points, &config.ribbon_params(), terrain)
}
