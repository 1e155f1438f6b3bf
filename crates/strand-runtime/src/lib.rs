//! Strand Runtime - Per-frame processing of spline meshes and vegetation
//!
//! - `Environment`: read-only capabilities supplied by the host (camera,
//!   terrains, control points, mask pixels)
//! - `MeshSink` / `InstanceSink`: where results are published
//! - `SplineMeshProcessor`: regenerates ribbon meshes and disposes stale ones
//! - `VegetationProcessor`: one rayon task per layer: mask, pages, culling
//! - `TerrainScene`: `RuntimeSystem` running both in order each frame

mod environment;
mod scene;
mod spline_sync;
mod system;
mod vegetation_sync;

pub use environment::{Environment, InstanceSink, MeshData, MeshSink};
pub use scene::TerrainScene;
pub use spline_sync::{SplineMeshProcessor, SplineRenderData, SplineSnapshot};
pub use system::{FrameContext, RuntimeSystem};
pub use vegetation_sync::VegetationProcessor;
