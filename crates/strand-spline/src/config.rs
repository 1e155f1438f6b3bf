//! `spline_mesh` component configuration

use serde::{Deserialize, Serialize};

use crate::ribbon::RibbonParams;

/// Settings of one spline mesh, read from a TOML component table.
/// Missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineMeshConfig {
    /// Distance between resampled path points
    pub segment_length: f32,
    /// Ribbon width
    pub width: f32,
    /// How "long" one texture repeat is along the path, in world units
    pub segment_uv_length: f32,
    /// Material asset name; a spline without one is not drawn
    pub material: Option<String>,
    pub cast_shadows: bool,
    /// Terrain to drape the ribbon over, by name
    pub terrain: Option<String>,
    /// Height above the terrain surface when draped
    pub height_offset: f32,
}

impl Default for SplineMeshConfig {
    fn default() -> Self {
        Self {
            segment_length: 1.0,
            width: 2.0,
            segment_uv_length: 1.0,
            material: None,
            cast_shadows: false,
            terrain: None,
            height_offset: 0.1,
        }
    }
}

impl SplineMeshConfig {
    pub fn ribbon_params(&self) -> RibbonParams {
        RibbonParams {
            width: self.width,
            segment_uv_length: self.segment_uv_length,
            height_offset: self.height_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_uses_defaults() {
        let config: SplineMeshConfig = toml::from_str(
            r#"
            width = 4.0
            material = "road"
            terrain = "island"
            "#,
        )
        .unwrap();

        assert_eq!(config.width, 4.0);
        assert_eq!(config.material.as_deref(), Some("road"));
        assert_eq!(config.terrain.as_deref(), Some("island"));
        assert_eq!(config.segment_length, 1.0);
        assert_eq!(config.segment_uv_length, 1.0);
        assert!((config.height_offset - 0.1).abs() < 1e-6);
        assert!(!config.cast_shadows);
    }

    #[test]
    fn ribbon_params_mirror_config() {
        let config = SplineMeshConfig {
            width: 3.0,
            segment_uv_length: 5.0,
            height_offset: 0.25,
            ..Default::default()
        };
        let p = config.ribbon_params();
        assert_eq!((p.width, p.segment_uv_length, p.height_offset), (3.0, 5.0, 0.25));
    }
}
