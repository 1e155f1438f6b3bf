//! Heightmap loading and sampling

use std::path::Path;

use strand_core::{Result, StrandError, Vec3};

use crate::sampler::TerrainSampler;

/// A grid of signed 16-bit height samples with bilinear sampling.
///
/// Samples map to heights by inverse-lerping over the full `i16` range and
/// scaling by `height_range`, so `i16::MIN` is height 0 and `i16::MAX` is
/// `height_range`.
pub struct Heightmap {
    /// Row-major samples, `depth` rows of `width` columns
    samples: Vec<i16>,
    /// Width in samples
    pub width: u32,
    /// Depth (height) in samples
    pub depth: u32,
    /// Physical edge length in world units
    pub size: f32,
    /// World height of the largest sample value
    pub height_range: f32,
}

impl Heightmap {
    /// Load a heightmap from a grayscale PNG file.
    /// Pixel values of any bit depth are widened to 16 bits and re-biased to `i16`.
    pub fn from_png(path: &Path, size: f32, height_range: f32) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            StrandError::ImageError(format!(
                "Failed to load heightmap '{}': {}",
                path.display(),
                e
            ))
        })?;

        let gray = img.into_luma16();
        let width = gray.width();
        let depth = gray.height();

        let samples: Vec<i16> = gray
            .pixels()
            .map(|p| (p.0[0] as i32 + i16::MIN as i32) as i16)
            .collect();

        Self::from_raw(samples, width, depth, size, height_range)
    }

    /// Create a heightmap from raw samples
    pub fn from_raw(
        samples: Vec<i16>,
        width: u32,
        depth: u32,
        size: f32,
        height_range: f32,
    ) -> Result<Self> {
        if width < 2 || depth < 2 {
            return Err(StrandError::InvalidConfig(format!(
                "heightmap must be at least 2x2 samples, got {}x{}",
                width, depth
            )));
        }
        if samples.len() != (width * depth) as usize {
            return Err(StrandError::InvalidConfig(format!(
                "heightmap has {} samples, expected {}x{}",
                samples.len(),
                width,
                depth
            )));
        }
        if size <= 0.0 {
            return Err(StrandError::InvalidConfig(format!(
                "terrain size must be positive, got {}",
                size
            )));
        }

        Ok(Self {
            samples,
            width,
            depth,
            size,
            height_range,
        })
    }

    /// Height of a single sample, or 0 outside the grid.
    pub fn sample_height(&self, x: i32, z: i32) -> f32 {
        if !self.is_valid_sample(x, z) {
            return 0.0;
        }

        let raw = self.samples[(z as u32 * self.width + x as u32) as usize];
        let normalized = (raw as f32 - i16::MIN as f32) / (i16::MAX as f32 - i16::MIN as f32);
        normalized * self.height_range
    }

    pub fn is_valid_sample(&self, x: i32, z: i32) -> bool {
        x >= 0 && (x as u32) < self.width && z >= 0 && (z as u32) < self.depth
    }

    /// World units between neighbouring samples along X and Z
    fn cell_size(&self) -> (f32, f32) {
        (
            self.size / (self.width - 1) as f32,
            self.size / (self.depth - 1) as f32,
        )
    }

    /// Convert centred world XZ into fractional sample coordinates.
    /// Returns `None` outside the grid.
    fn to_grid(&self, x: f32, z: f32) -> Option<(f32, f32)> {
        let half = self.size * 0.5;
        let (cell_x, cell_z) = self.cell_size();
        let gx = (x + half) / cell_x;
        let gz = (z + half) / cell_z;

        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_z).contains(&gz) {
            return None;
        }
        Some((gx, gz))
    }
}

impl TerrainSampler for Heightmap {
    fn size(&self) -> f32 {
        self.size
    }

    fn height_at(&self, x: f32, z: f32) -> f32 {
        let Some((gx, gz)) = self.to_grid(x, z) else {
            return 0.0;
        };

        let x0 = (gx as u32).min(self.width - 2) as i32;
        let z0 = (gz as u32).min(self.depth - 2) as i32;
        let tx = gx - x0 as f32;
        let tz = gz - z0 as f32;

        let h00 = self.sample_height(x0, z0);
        let h10 = self.sample_height(x0 + 1, z0);
        let h01 = self.sample_height(x0, z0 + 1);
        let h11 = self.sample_height(x0 + 1, z0 + 1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;

        h0 * (1.0 - tz) + h1 * tz
    }

    /// Central differences around the nearest sample.
    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let Some((gx, gz)) = self.to_grid(x, z) else {
            return Vec3::UP;
        };

        let sx = gx.round() as i32;
        let sz = gz.round() as i32;
        let (cell_x, cell_z) = self.cell_size();

        let height_l = self.sample_height(sx - 1, sz);
        let height_r = self.sample_height(sx + 1, sz);
        let height_d = self.sample_height(sx, sz - 1);
        let height_u = self.sample_height(sx, sz + 1);

        let normal = Vec3::new(
            (height_l - height_r) * cell_z,
            2.0 * cell_x * cell_z,
            (height_d - height_u) * cell_x,
        );
        normal.try_normalized().unwrap_or(Vec3::UP)
    }
}
