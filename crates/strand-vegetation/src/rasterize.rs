//! Exclusion rasterizer: carves blocking spline geometry out of a density mask.
//!
//! Triangles are projected top-down (Y dropped) into mask pixel space and
//! every covered pixel has the mask channel set to zero.

use strand_core::Vec3;

use crate::mask::{DensityMask, MaskChannel};

/// Maps centred world XZ onto the pixels of a mask covering the whole terrain
#[derive(Debug, Clone, Copy)]
pub struct MaskProjection {
    pub terrain_size: f32,
    pub mask_width: u32,
    pub mask_height: u32,
}

impl MaskProjection {
    pub fn new(terrain_size: f32, mask: &DensityMask) -> Self {
        Self {
            terrain_size,
            mask_width: mask.width(),
            mask_height: mask.height(),
        }
    }

    /// Fractional pixel coordinates of a world position
    pub fn project(&self, x: f32, z: f32) -> (f32, f32) {
        let half = self.terrain_size * 0.5;
        (
            (x + half) / self.terrain_size * self.mask_width as f32,
            (z + half) / self.terrain_size * self.mask_height as f32,
        )
    }

    /// Pixel containing a world position
    pub fn pixel(&self, x: f32, z: f32) -> (i32, i32) {
        let (px, py) = self.project(x, z);
        (px.floor() as i32, py.floor() as i32)
    }
}

/// Triangle in integer pixel space
pub type PixelTriangle = [(i32, i32); 3];

fn cross(a: (i32, i32), b: (i32, i32)) -> i64 {
    a.0 as i64 * b.1 as i64 - a.1 as i64 * b.0 as i64
}

/// Zero `channel` for every pixel inside `tri`. Returns the number of pixels written.
///
/// The scan covers `min_x..=max_x` but only `min_y..max_y`: the bottom row of
/// the bounding box is never written. Pixels outside the mask are skipped.
pub fn rasterize_triangle(mask: &mut DensityMask, channel: MaskChannel, tri: PixelTriangle) -> usize {
    let [v1, v2, v3] = tri;

    // Bounding box clipped to the mask; the bottom row stays exclusive
    let width = mask.width().min(i32::MAX as u32) as i32;
    let height = mask.height().min(i32::MAX as u32) as i32;
    let min_x = v1.0.min(v2.0).min(v3.0).max(0);
    let max_x = v1.0.max(v2.0).max(v3.0).min(width - 1);
    let min_y = v1.1.min(v2.1).min(v3.1).max(0);
    let max_y = v1.1.max(v2.1).max(v3.1).min(height);

    let vs1 = (v2.0 - v1.0, v2.1 - v1.1);
    let vs2 = (v3.0 - v1.0, v3.1 - v1.1);
    let denom = cross(vs1, vs2);
    if denom == 0 {
        return 0;
    }
    let denom = denom as f32;

    let mut written = 0;
    for x in min_x..=max_x {
        for y in min_y..max_y {
            let q = (x - v1.0, y - v1.1);
            let s = cross(q, vs2) as f32 / denom;
            let t = cross(vs1, q) as f32 / denom;

            if s >= 0.0 && t >= 0.0 && s + t <= 1.0 && mask.clear_channel(x, y, channel) {
                written += 1;
            }
        }
    }
    written
}

/// Project world-space triangles through `projection` and rasterize them.
pub fn rasterize_triangles<I>(
    mask: &mut DensityMask,
    channel: MaskChannel,
    projection: &MaskProjection,
    triangles: I,
) -> usize
where
    I: IntoIterator<Item = [Vec3; 3]>,
{
    triangles
        .into_iter()
        .map(|[a, b, c]| {
            let tri = [
                projection.pixel(a.x, a.z),
                projection.pixel(b.x, b.z),
                projection.pixel(c.x, c.z),
            ];
            rasterize_triangle(mask, channel, tri)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_triangle_clears_inside_pixels_only() {
        let mut mask = DensityMask::filled(8, 8, [255; 4]);
        let written = rasterize_triangle(&mut mask, MaskChannel::R, [(0, 0), (4, 0), (0, 4)]);

        // Rows 0..4 (exclusive), x + y <= 4
        assert_eq!(written, 5 + 4 + 3 + 2);
        for y in 0..8 {
            for x in 0..8 {
                let inside = y < 4 && x + y <= 4;
                let expected = if inside { 0 } else { 255 };
                assert_eq!(mask.pixel(x, y).unwrap()[0], expected, "pixel ({}, {})", x, y);
                // Other channels are never touched
                assert_eq!(mask.pixel(x, y).unwrap()[1], 255);
            }
        }
    }

    #[test]
    fn bottom_row_of_bounds_is_not_written() {
        let mut mask = DensityMask::filled(8, 8, [255; 4]);
        rasterize_triangle(&mut mask, MaskChannel::A, [(1, 1), (5, 1), (1, 5)]);
        assert_eq!(mask.pixel(1, 5).unwrap()[3], 255);
        assert_eq!(mask.pixel(1, 4).unwrap()[3], 0);
        // Right edge column is inclusive
        assert_eq!(mask.pixel(5, 1).unwrap()[3], 0);
    }

    #[test]
    fn winding_does_not_matter() {
        let mut a = DensityMask::filled(8, 8, [255; 4]);
        let mut b = DensityMask::filled(8, 8, [255; 4]);
        rasterize_triangle(&mut a, MaskChannel::R, [(0, 0), (6, 1), (2, 6)]);
        rasterize_triangle(&mut b, MaskChannel::R, [(0, 0), (2, 6), (6, 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_and_offscreen_triangles_are_harmless() {
        let mut mask = DensityMask::filled(4, 4, [255; 4]);
        assert_eq!(rasterize_triangle(&mut mask, MaskChannel::R, [(0, 0), (2, 2), (3, 3)]), 0);
        assert_eq!(
            rasterize_triangle(&mut mask, MaskChannel::R, [(-10, -10), (-5, -10), (-10, -5)]),
            0
        );
        assert_eq!(mask, DensityMask::filled(4, 4, [255; 4]));
    }

    #[test]
    fn huge_triangle_is_clipped_to_the_mask() {
        // Scanning the unclipped box would visit ~2e12 pixels
        let mut mask = DensityMask::filled(8, 8, [255; 4]);
        let written = rasterize_triangle(
            &mut mask,
            MaskChannel::R,
            [(-1_000_000, 0), (1_000_000, 0), (0, 1_000_000)],
        );
        assert_eq!(written, 64);
        assert_eq!(mask, DensityMask::filled(8, 8, [0, 255, 255, 255]));

        // Partially covering: still clipped on the right and bottom, bottom row exclusive
        let mut mask = DensityMask::filled(8, 8, [255; 4]);
        let written = rasterize_triangle(&mut mask, MaskChannel::R, [(2, 6), (40, 6), (2, 40)]);
        assert_eq!(written, 6 * 2);
        assert_eq!(mask.pixel(2, 5).unwrap()[0], 255);
        assert_eq!(mask.pixel(7, 7).unwrap()[0], 0);
    }

    #[test]
    fn world_triangles_project_onto_centred_terrain() {
        // 16 world units onto 16 pixels: world (-8, -8) is pixel (0, 0)
        let mut mask = DensityMask::filled(16, 16, [255; 4]);
        let projection = MaskProjection::new(16.0, &mask);
        assert_eq!(projection.pixel(-8.0, -8.0), (0, 0));
        assert_eq!(projection.pixel(0.5, 0.5), (8, 8));

        let tri = [
            Vec3::new(-8.0, 3.0, -8.0),
            Vec3::new(-4.0, 7.0, -8.0),
            Vec3::new(-8.0, 1.0, -4.0),
        ];
        let written = rasterize_triangles(&mut mask, MaskChannel::R, &projection, [tri]);
        assert_eq!(written, 14);
        assert_eq!(mask.pixel(0, 0).unwrap()[0], 0);
        assert_eq!(mask.pixel(8, 8).unwrap()[0], 255);
    }
}
