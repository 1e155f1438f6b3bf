//! `vegetation` component configuration

use serde::{Deserialize, Serialize};
use strand_core::{Result, StrandError};

use crate::cull::CullParams;
use crate::mask::MaskChannel;
use crate::page::ScatterParams;

/// Settings of one vegetation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationConfig {
    /// Terrain the layer is scattered over, by name
    pub terrain: Option<String>,
    /// Density mask asset, by name
    pub mask: Option<String>,
    pub mask_channel: MaskChannel,
    /// Instances per world unit along each page row
    pub density: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Accepted slope band, where slope is `1 - |normal.y|`
    pub min_slope: f32,
    pub max_slope: f32,
    pub seed: u32,
    pub view_distance: f32,
    /// Shrink instances over the last 20% of the view distance
    pub use_distance_scaling: bool,
    /// Drop instances beyond the view distance instead of only fading them
    pub hard_distance_cutoff: bool,
    /// Spline mesh entities whose ribbons are carved out of the mask
    pub blocking_splines: Vec<String>,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            terrain: None,
            mask: None,
            mask_channel: MaskChannel::R,
            density: 1.0,
            min_scale: 0.5,
            max_scale: 1.5,
            min_slope: 0.0,
            max_slope: 1.0,
            seed: 0,
            view_distance: 64.0,
            use_distance_scaling: true,
            hard_distance_cutoff: false,
            blocking_splines: Vec::new(),
        }
    }
}

impl VegetationConfig {
    /// Reject settings that can never produce a sensible layer.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(StrandError::InvalidConfig(format!(
                "vegetation density must be a non-negative number, got {}",
                self.density
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(StrandError::InvalidConfig(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        for (field, value) in [("min_slope", self.min_slope), ("max_slope", self.max_slope)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StrandError::ValueOutOfRange {
                    field: field.to_string(),
                    min: 0.0,
                    max: 1.0,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }

    pub fn scatter_params(&self) -> ScatterParams {
        ScatterParams {
            density: self.density,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            min_slope: self.min_slope,
            max_slope: self.max_slope,
            seed: self.seed,
        }
    }

    pub fn cull_params(&self) -> CullParams {
        CullParams {
            view_distance: self.view_distance,
            use_distance_scaling: self.use_distance_scaling,
            hard_cutoff: self.hard_distance_cutoff,
        }
    }
}
