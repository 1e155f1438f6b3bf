//! Bounding volumes for generated meshes

use strand_core::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Sphere centred on the point average, enclosing every point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let sum = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
        let center = sum / points.len() as f32;
        let radius = points
            .iter()
            .map(|p| p.distance(&center))
            .fold(0.0_f32, f32::max);

        Some(Self { center, radius })
    }
}

/// Box and sphere published alongside a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
    pub aabb: BoundingBox,
    pub sphere: BoundingSphere,
}

impl MeshBounds {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        Some(Self {
            aabb: BoundingBox::from_points(points)?,
            sphere: BoundingSphere::from_points(points)?,
        })
    }
}
