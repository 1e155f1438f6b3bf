//! Density mask pixel buffer

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use strand_core::{Result, StrandError};

/// Colour channel of the mask that drives placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskChannel {
    #[default]
    R,
    G,
    B,
    A,
}

impl MaskChannel {
    pub fn index(self) -> usize {
        match self {
            MaskChannel::R => 0,
            MaskChannel::G => 1,
            MaskChannel::B => 2,
            MaskChannel::A => 3,
        }
    }
}

/// An RGBA8 image whose selected channel modulates spawn probability.
///
/// Owned by one vegetation layer; the exclusion rasterizer writes zeros into
/// it and the pager reads it back during the same rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMask {
    image: RgbaImage,
}

impl DensityMask {
    /// A mask with every pixel set to `fill`
    pub fn filled(width: u32, height: u32, fill: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(fill)),
        }
    }

    /// Wrap tightly packed RGBA8 pixel data
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            StrandError::InvalidConfig(format!(
                "mask data is {} bytes, expected {} for {}x{} RGBA8",
                actual, expected, width, height
            ))
        })?;
        Ok(Self { image })
    }

    pub fn from_image(image: &image::DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    /// Decode a mask image (any format the `image` crate reads) from disk
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            StrandError::ImageError(format!("Failed to load mask '{}': {}", path.display(), e))
        })?;
        Ok(Self::from_image(&img))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.contains(x, y)
            .then(|| self.image.get_pixel(x as u32, y as u32).0)
    }

    /// Channel value normalized to `[0, 1]`, or `None` outside the mask
    pub fn density(&self, x: i32, y: i32, channel: MaskChannel) -> Option<f32> {
        self.pixel(x, y)
            .map(|p| p[channel.index()] as f32 / 255.0)
    }

    /// Zero one channel of a pixel, leaving the others untouched.
    /// Returns false outside the mask.
    pub fn clear_channel(&mut self, x: i32, y: i32, channel: MaskChannel) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.image.get_pixel_mut(x as u32, y as u32).0[channel.index()] = 0;
        true
    }
}
