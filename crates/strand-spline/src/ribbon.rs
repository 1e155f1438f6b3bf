//! Flat ribbon mesh generation along an evenly spaced path.
//!
//! Every path point contributes three vertices (left edge, centre, right
//! edge); consecutive triples are stitched with two quads (four triangles):
//!
//! ```text
//!   L1 ─── C1 ─── R1      i + 1
//!   │ ╲    │ ╲    │
//!   │  ╲   │  ╲   │
//!   L0 ─── C0 ─── R0      i
//! ```

use strand_core::Vec3;
use strand_terrain::TerrainSampler;

use crate::bounds::MeshBounds;
use crate::vertex::RibbonVertex;

/// Ribbon shape parameters
#[derive(Debug, Clone, Copy)]
pub struct RibbonParams {
    /// Full ribbon width in world units
    pub width: f32,
    /// World distance over which the texture V coordinate advances by 1
    pub segment_uv_length: f32,
    /// Added to the terrain height when snapping
    pub height_offset: f32,
}

/// Triangle-list mesh produced by `build_ribbon`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibbonMesh {
    pub vertices: Vec<RibbonVertex>,
    pub indices: Vec<u32>,
}

impl RibbonMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bounds over the left-edge and centre vertex of every point triple.
    ///
    /// Right-edge vertices are left out; for a symmetric ribbon the centre
    /// sits between both edges so the box is short by at most half a width
    /// on the right side.
    pub fn bounds(&self) -> Option<MeshBounds> {
        let points: Vec<Vec3> = self
            .vertices
            .chunks_exact(3)
            .flat_map(|triple| {
                [
                    Vec3::from_array(triple[0].position),
                    Vec3::from_array(triple[1].position),
                ]
            })
            .collect();
        MeshBounds::from_points(&points)
    }

    /// Iterate triangles as world-space position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from_array(self.vertices[tri[0] as usize].position),
                Vec3::from_array(self.vertices[tri[1] as usize].position),
                Vec3::from_array(self.vertices[tri[2] as usize].position),
            ]
        })
    }
}

/// Build a ribbon along `points`, optionally draped over `terrain`.
///
/// Returns an empty mesh for fewer than two points or a non-positive width.
/// With a terrain, path points are snapped before forward directions are
/// computed and every emitted vertex is snapped again after extrusion.
pub fn build_ribbon(
    points: &[Vec3],
    params: &RibbonParams,
    terrain: Option<&dyn TerrainSampler>,
) -> RibbonMesh {
    if points.len() < 2 || !(params.width > 0.0) {
        return RibbonMesh::default();
    }

    let snap = |p: Vec3| match terrain {
        Some(t) => p.with_y(t.height_at(p.x, p.z) + params.height_offset),
        None => p,
    };

    let points: Vec<Vec3> = points.iter().map(|&p| snap(p)).collect();
    let count = points.len();

    let uv_scale = if params.segment_uv_length > 0.0 {
        1.0 / params.segment_uv_length
    } else {
        0.0
    };

    let mut vertices = Vec::with_capacity(count * 3);
    let mut indices = Vec::with_capacity((count - 1) * 12);

    let half_width = params.width * 0.5;
    let mut total_distance = 0.0_f32;
    let mut last_forward = Vec3::UNIT_Z;

    for i in 0..count {
        let mut forward = Vec3::ZERO;
        if i + 1 < count {
            forward += points[i + 1] - points[i];
        }
        if i > 0 {
            forward += points[i] - points[i - 1];
        }
        // Coincident neighbours keep the previous direction
        let forward = forward.try_normalized().unwrap_or(last_forward);
        last_forward = forward;

        let right = forward.cross(&Vec3::UP);
        let left = -right;

        let center = points[i];
        let p0 = snap(center + left * half_width);
        let p1 = snap(center);
        let p2 = snap(center + right * half_width);

        if i > 0 {
            total_distance += points[i].distance(&points[i - 1]);
        }
        let v = total_distance * uv_scale;

        let color = encode_forward(forward, i == 0 || i == count - 1);

        for (position, u) in [(p0, 0.0), (p1, 0.5), (p2, 1.0)] {
            vertices.push(RibbonVertex {
                position: position.to_array(),
                normal: Vec3::UP.to_array(),
                tangent: Vec3::UNIT_Z.to_array(),
                color,
                uv: [u, v],
            });
        }

        if i + 1 < count {
            let base = (i * 3) as u32;
            indices.extend_from_slice(&[
                base,
                base + 3,
                base + 1,
                base + 1,
                base + 3,
                base + 4,
                base + 1,
                base + 4,
                base + 2,
                base + 2,
                base + 4,
                base + 5,
            ]);
        }
    }

    RibbonMesh { vertices, indices }
}

/// Pack a unit forward vector into RGB (`(f + 1) / 2 * 255`, truncated);
/// alpha is 0 at the path ends and 255 elsewhere.
fn encode_forward(forward: Vec3, is_end: bool) -> [u8; 4] {
    let biased = (forward + Vec3::ONE) / 2.0 * 255.0;
    [
        biased.x as u8,
        biased.y as u8,
        biased.z as u8,
        if is_end { 0 } else { 255 },
    ]
}
