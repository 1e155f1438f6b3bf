//! Pure spline math: uniform Catmull-Rom evaluation.

use crate::Vec3;

/// Catmull-Rom spline interpolation between four points.
///
/// The curve passes through `p1` at `t = 0` and `p2` at `t = 1`; `p0` and
/// `p3` only shape the tangents.
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        catmull_rom_scalar(p0.x, p1.x, p2.x, p3.x, t),
        catmull_rom_scalar(p0.y, p1.y, p2.y, p3.y, t),
        catmull_rom_scalar(p0.z, p1.z, p2.z, p3.z, t),
    )
}

/// Catmull-Rom interpolation for a single scalar value.
pub fn catmull_rom_scalar(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Control quadruple for the segment starting at `points[i]`.
///
/// The neighbours before and after are clamped at the ends of the sequence by
/// repeating the boundary point. Requires `i + 1 < points.len()`.
pub fn segment_controls(points: &[Vec3], i: usize) -> [Vec3; 4] {
    let p1 = points[i];
    let p2 = points[i + 1];
    let p0 = if i > 0 { points[i - 1] } else { points[0] };
    let p3 = if i + 2 < points.len() { points[i + 2] } else { p2 };
    [p0, p1, p2, p3]
}
