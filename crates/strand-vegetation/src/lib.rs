//! Strand Vegetation - Paged instance scattering over terrain
//!
//! A vegetation layer goes through three stages:
//! - `rasterize` carves blocking spline ribbons out of the density mask
//! - `page::build_pages` scatters instances over a grid of fixed-size pages,
//!   filtered by mask density and terrain slope
//! - `cull::cull_pages` runs every frame, selecting nearby pages and fading
//!   instances out towards the view distance

pub mod config;
pub mod cull;
pub mod mask;
pub mod page;
pub mod rand;
pub mod rasterize;

pub use config::VegetationConfig;
pub use cull::{cull_pages, fade_scale, CullParams};
pub use mask::{DensityMask, MaskChannel};
pub use page::{build_pages, ScatterParams, VegetationPage, PAGE_SIZE};
pub use rand::ScatterRng;
pub use rasterize::{rasterize_triangles, MaskProjection};

use strand_core::Vec3;
use strand_spline::RibbonMesh;

/// Convert Strand Vec3 to glam Vec3
pub fn to_glam_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}

/// Zero the mask under every triangle of a blocking ribbon.
/// Returns the number of pixels written.
pub fn carve_ribbon(
    mask: &mut DensityMask,
    channel: MaskChannel,
    terrain_size: f32,
    ribbon: &RibbonMesh,
) -> usize {
    let projection = MaskProjection::new(terrain_size, mask);
    rasterize_triangles(mask, channel, &projection, ribbon.triangles())
}
