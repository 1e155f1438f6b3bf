//! World-space terrain sampling

use strand_core::Vec3;

/// Height and normal queries against a square terrain centred on the origin.
///
/// Implementations return height 0 and the up normal outside their bounds.
pub trait TerrainSampler: Send + Sync {
    /// Physical edge length of the (square) terrain in world units
    fn size(&self) -> f32;

    /// World-space height at `(x, z)`
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Unit surface normal at `(x, z)`
    fn normal_at(&self, x: f32, z: f32) -> Vec3;
}

/// A constant-height terrain with no heightmap behind it
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub size: f32,
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(size: f32, height: f32) -> Self {
        Self { size, height }
    }

    fn contains(&self, x: f32, z: f32) -> bool {
        let half = self.size * 0.5;
        (-half..=half).contains(&x) && (-half..=half).contains(&z)
    }
}

impl TerrainSampler for FlatTerrain {
    fn size(&self) -> f32 {
        self.size
    }

    fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.contains(x, z) {
            self.height
        } else {
            0.0
        }
    }

    fn normal_at(&self, _x: f32, _z: f32) -> Vec3 {
        Vec3::UP
    }
}
