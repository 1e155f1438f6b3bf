//! Page grid and deterministic instance scattering

use glam::{Mat4, Quat};
use strand_core::Vec3;
use strand_terrain::TerrainSampler;

use crate::mask::{DensityMask, MaskChannel};
use crate::rand::ScatterRng;
use crate::rasterize::MaskProjection;
use crate::to_glam_vec3;

/// Edge length of one page in world units
pub const PAGE_SIZE: u32 = 16;

/// One square tile of scattered instances
#[derive(Debug, Clone, PartialEq)]
pub struct VegetationPage {
    /// Page centre on the XZ plane (y = 0)
    pub world_position: Vec3,
    /// World matrices: uniform scale, then normal-aligned yaw, then translation
    pub instances: Vec<Mat4>,
}

impl VegetationPage {
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Scatter settings for one layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterParams {
    pub density: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub min_slope: f32,
    pub max_slope: f32,
    pub seed: u32,
}

/// Number of pages along each axis of a terrain
pub fn pages_per_row(terrain_size: f32) -> u32 {
    if terrain_size.is_finite() && terrain_size > 0.0 {
        terrain_size as u32 / PAGE_SIZE
    } else {
        0
    }
}

/// Build every page of the terrain grid, indexed `row * pages_per_row + col`.
///
/// A single generator is seeded once and consumed page by page, row by row,
/// column by column. Each candidate draws X jitter then Z jitter; candidates
/// that land on the mask draw a density value, those that pass every filter
/// draw a scale and then a yaw angle. Pages that end up empty are kept.
pub fn build_pages(
    terrain: &dyn TerrainSampler,
    mask: &DensityMask,
    channel: MaskChannel,
    params: &ScatterParams,
) -> Vec<VegetationPage> {
    let terrain_size = terrain.size();
    let per_row = pages_per_row(terrain_size);
    if per_row == 0 || !(params.density > 0.0) {
        return Vec::new();
    }

    let page_size = PAGE_SIZE as f32;
    let instances_per_row = (page_size * params.density) as u32;
    let spacing = if instances_per_row > 0 {
        page_size / instances_per_row as f32
    } else {
        0.0
    };

    let half = terrain_size * 0.5;
    let page_offset = Vec3::new(page_size * 0.5, 0.0, page_size * 0.5);
    let projection = MaskProjection::new(terrain_size, mask);
    let mut rng = ScatterRng::new(params.seed);

    let mut pages = Vec::with_capacity((per_row * per_row) as usize);
    for page_z in 0..per_row {
        for page_x in 0..per_row {
            let corner = Vec3::new(
                page_x as f32 * page_size - half,
                0.0,
                page_z as f32 * page_size - half,
            );

            let mut instances = Vec::new();
            for iz in 0..instances_per_row {
                for ix in 0..instances_per_row {
                    let x = corner.x + ix as f32 * spacing + rng.range(-spacing, spacing);
                    let z = corner.z + iz as f32 * spacing + rng.range(-spacing, spacing);

                    if let Some(transform) =
                        scatter_candidate(terrain, mask, channel, &projection, params, &mut rng, x, z)
                    {
                        instances.push(transform);
                    }
                }
            }

            pages.push(VegetationPage {
                world_position: corner + page_offset,
                instances,
            });
        }
    }
    pages
}

/// Run the rejection filters for one jittered position; `None` means skipped.
#[allow(clippy::too_many_arguments)]
fn scatter_candidate(
    terrain: &dyn TerrainSampler,
    mask: &DensityMask,
    channel: MaskChannel,
    projection: &MaskProjection,
    params: &ScatterParams,
    rng: &mut ScatterRng,
    x: f32,
    z: f32,
) -> Option<Mat4> {
    let (px, py) = projection.pixel(x, z);
    let density = mask.density(px, py, channel)?;

    let draw = rng.next_f32();
    if density <= 0.0 || draw > density {
        return None;
    }

    let normal = terrain.normal_at(x, z);
    let slope = 1.0 - normal.y.abs();
    if slope < params.min_slope || slope > params.max_slope {
        return None;
    }

    let scale = rng.range(params.min_scale, params.max_scale);
    let yaw = rng.range(0.0, std::f32::consts::TAU);

    let up = to_glam_vec3(normal).normalize_or(glam::Vec3::Y);
    let rotation = Quat::from_rotation_arc(glam::Vec3::Y, up) * Quat::from_rotation_y(yaw);
    let translation = glam::Vec3::new(x, terrain.height_at(x, z), z);

    Some(Mat4::from_scale_rotation_translation(
        glam::Vec3::splat(scale),
        rotation,
        translation,
    ))
}
