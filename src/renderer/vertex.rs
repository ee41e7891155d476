use bytemuck::{Pod, Zeroable};
use std::mem;

/// One corner of the tile block, relative to the tile's map position.
///
/// `uv` addresses the first cell of the sprite sheet; the vertex shader
/// shifts it to the tile's variant row and animation column.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TileVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TileVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TileVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[inline]
pub fn tv(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> TileVertex {
    TileVertex { pos, normal, uv }
}

/// Line endpoint for the debug overlay, colored per vertex.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct DebugVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}

impl DebugVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<DebugVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_strides_match_struct_sizes() {
        assert_eq!(
            TileVertex::layout().array_stride,
            std::mem::size_of::<TileVertex>() as wgpu::BufferAddress
        );
        assert_eq!(DebugVertex::layout().array_stride, 24);
    }
}
