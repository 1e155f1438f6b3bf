//! Ribbon vertex layout shared with the renderer

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

/// Vertex of a ribbon mesh. 48 bytes, 4-byte aligned.
///
/// `color` does not carry lighting colour: RGB holds the path's forward
/// direction biased into `[0, 255]` and alpha fades the two path ends.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub color: [u8; 4],
    pub uv: [f32; 2],
}

/// Attribute formats understood by the instancing/mesh collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Unorm8x4,
}

/// One attribute of the vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    pub semantic: &'static str,
    pub format: VertexFormat,
    pub offset: usize,
}

impl RibbonVertex {
    pub const STRIDE: usize = size_of::<RibbonVertex>();

    pub const LAYOUT: [VertexElement; 5] = [
        VertexElement {
            semantic: "POSITION",
            format: VertexFormat::Float32x3,
            offset: offset_of!(RibbonVertex, position),
        },
        VertexElement {
            semantic: "NORMAL",
            format: VertexFormat::Float32x3,
            offset: offset_of!(RibbonVertex, normal),
        },
        VertexElement {
            semantic: "TANGENT",
            format: VertexFormat::Float32x3,
            offset: offset_of!(RibbonVertex, tangent),
        },
        VertexElement {
            semantic: "COLOR",
            format: VertexFormat::Unorm8x4,
            offset: offset_of!(RibbonVertex, color),
        },
        VertexElement {
            semantic: "TEXCOORD",
            format: VertexFormat::Float32x2,
            offset: offset_of!(RibbonVertex, uv),
        },
    ];

    /// Raw bytes of a vertex slice, ready for a vertex buffer upload
    pub fn as_bytes(vertices: &[RibbonVertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}
