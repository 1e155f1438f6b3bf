//! Per-frame page selection and distance fade

use glam::Mat4;
use strand_core::Vec3;

use crate::page::{VegetationPage, PAGE_SIZE};
use crate::to_glam_vec3;

/// Fade starts at this fraction of the view distance
const FADE_START: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullParams {
    pub view_distance: f32,
    pub use_distance_scaling: bool,
    pub hard_cutoff: bool,
}

/// Scale factor for an instance `distance` away from the camera.
///
/// 1 up to 80% of the view distance, then a quadratic falloff to 0 at the
/// view distance.
pub fn fade_scale(distance: f32, view_distance: f32) -> f32 {
    let fade_start = FADE_START * view_distance;
    let fade_range = view_distance - fade_start;
    if fade_range <= 0.0 {
        return 0.0;
    }

    let past = (distance - fade_start).max(0.0);
    let relative = (past / fade_range).min(1.0);
    1.0 - relative * relative
}

/// Pages whose centre lies within `view_distance + PAGE_SIZE` of the camera
/// on the XZ plane. Empty pages are skipped.
pub fn visible_pages<'a>(
    pages: &'a [VegetationPage],
    camera: Vec3,
    view_distance: f32,
) -> impl Iterator<Item = &'a VegetationPage> + 'a {
    let flat_camera = camera.with_y(0.0);
    let limit = view_distance + PAGE_SIZE as f32;
    pages.iter().filter(move |page| {
        !page.is_empty() && page.world_position.with_y(0.0).distance(&flat_camera) < limit
    })
}

/// Rebuild `out` with the transforms visible from `camera`.
///
/// Output keeps page order, then insertion order within a page.
pub fn cull_pages(pages: &[VegetationPage], camera: Vec3, params: &CullParams, out: &mut Vec<Mat4>) {
    out.clear();
    if !(params.view_distance > 0.0) {
        return;
    }

    let eye = to_glam_vec3(camera);
    let max_distance_squared = params.view_distance * params.view_distance;

    for page in visible_pages(pages, camera, params.view_distance) {
        for world in &page.instances {
            let distance_squared = world.w_axis.truncate().distance_squared(eye);
            if params.hard_cutoff && distance_squared >= max_distance_squared {
                continue;
            }

            if params.use_distance_scaling {
                let scale = fade_scale(distance_squared.sqrt(), params.view_distance);
                out.push(*world * Mat4::from_scale(glam::Vec3::splat(scale)));
            } else {
                out.push(*world);
            }
        }
    }
}
