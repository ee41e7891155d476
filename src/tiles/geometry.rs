//! The extruded isometric block every tile is drawn with.
//!
//! ```text
//!   /  0  \
//!   1     2
//!   \  3  /
//!
//!   4     8
//!   | 5 9 |
//!   6 | | 10
//!   \ 7 11/
//! ```
//!
//! Vertices 0..4 are the top face, 4..8 the +X side and 8..12 the +Y side.
//! Texture coordinates address one cell of the template's sprite sheet; the
//! shader offsets them by variant row and animation column.

use glam::{UVec2, Vec3};

use crate::renderer::backend::{BufferTarget, GpuBackend, RenderRecorder};
use crate::renderer::buffer::GpuBuffer;
use crate::renderer::vertex::{tv, TileVertex};
use crate::tiles::template::TileTemplate;

/// Width of one tile in screen pixels.
pub const TILE_SIZE: f32 = 20.0;

/// Screen-space images of the map's x, y and z unit vectors.
pub const AXES: [Vec3; 3] = [
    Vec3::new(-TILE_SIZE, -0.5 * TILE_SIZE, 0.001),
    Vec3::new(TILE_SIZE, -0.5 * TILE_SIZE, 0.001),
    Vec3::new(0.0, TILE_SIZE, 0.0),
];

pub const TILE_INDICES: [u32; 18] = [
    0, 1, 2, //
    1, 2, 3, //
    4, 5, 6, //
    6, 5, 7, //
    8, 9, 10, //
    10, 9, 11,
];

pub const TILE_INDEX_COUNT: u32 = TILE_INDICES.len() as u32;

#[derive(Debug, Clone, PartialEq)]
pub struct TileGeometry {
    pub vertices: [TileVertex; 12],
    /// Depth of the side faces below the top face, in map units.
    pub height: f32,
}

impl TileGeometry {
    pub fn for_template(template: &TileTemplate) -> Self {
        Self::from_sprite(
            template.texture().size,
            template.variant_count(),
            template.animation_frame_count(),
        )
    }

    /// Builds the block for a sprite sheet of `sprite_size` pixels holding
    /// `variant_count` rows and `animation_frame_count` columns.
    pub fn from_sprite(sprite_size: UVec2, variant_count: u32, animation_frame_count: u32) -> Self {
        assert!(
            variant_count > 0 && animation_frame_count > 0,
            "sprite sheet needs at least one cell, got {} x {}",
            animation_frame_count,
            variant_count
        );
        let width = sprite_size.x as f32;
        let height = sprite_size.y as f32;
        let cell_height = height / variant_count as f32;

        let max_u = 1.0 / animation_frame_count as f32;
        let max_v = 1.0 / variant_count as f32;

        let block_height = (cell_height + AXES[0].y + AXES[1].y) / AXES[2].y;
        assert!(
            block_height >= 0.0,
            "sprite cell height {} is shorter than the tile top, block height would be negative",
            cell_height
        );
        let bottom = -block_height;

        let uv0 = [-AXES[0].x / width, 0.0];
        let uv1 = [0.0, -AXES[0].y / height];
        let uv2 = [max_u, -AXES[1].y / height];
        let uv3 = [-AXES[0].x / width, (-AXES[0].y - AXES[1].y) / height];
        let uv4 = [uv1[0], max_v + AXES[1].y / height];
        let uv5 = [uv2[0], max_v + AXES[0].y / height];
        let uv6 = [uv3[0], max_v];

        let up = [0.0, 0.0, 1.0];
        let side_x = [1.0, 0.0, 0.0];
        let side_y = [0.0, 1.0, 0.0];

        let vertices = [
            tv([-0.5, -0.5, 0.0], up, uv0),
            tv([0.5, -0.5, 0.0], up, uv1),
            tv([-0.5, 0.5, 0.0], up, uv2),
            tv([0.5, 0.5, 0.0], up, uv3),
            tv([0.5, -0.5, 0.0], side_x, uv1),
            tv([0.5, 0.5, 0.0], side_x, uv3),
            tv([0.5, -0.5, bottom], side_x, uv4),
            tv([0.5, 0.5, bottom], side_x, uv6),
            tv([-0.5, 0.5, 0.0], side_y, uv2),
            tv([0.5, 0.5, 0.0], side_y, uv3),
            tv([-0.5, 0.5, bottom], side_y, uv5),
            tv([0.5, 0.5, bottom], side_y, uv6),
        ];

        Self {
            vertices,
            height: block_height,
        }
    }
}

/// Device copy of a [`TileGeometry`]: one vertex and one index buffer.
pub struct TileMesh<B: GpuBackend> {
    vertices: GpuBuffer<B>,
    indices: GpuBuffer<B>,
}

impl<B: GpuBackend> TileMesh<B> {
    pub fn new(backend: &B, geometry: &TileGeometry) -> Self {
        log::info!("Creating tile mesh (block height {:.3})", geometry.height);
        Self {
            vertices: GpuBuffer::with_contents(
                backend,
                "Tile Vertices",
                BufferTarget::Vertex,
                bytemuck::cast_slice(&geometry.vertices),
            ),
            indices: GpuBuffer::with_contents(
                backend,
                "Tile Indices",
                BufferTarget::Index,
                bytemuck::cast_slice(&TILE_INDICES),
            ),
        }
    }

    pub fn bind<R: RenderRecorder<B>>(&self, pass: &mut R) {
        pass.set_vertex_buffer(0, self.vertices.raw());
        pass.set_index_buffer(self.indices.raw());
    }

    pub fn vertices(&self) -> &GpuBuffer<B> {
        &self.vertices
    }

    pub fn indices(&self) -> &GpuBuffer<B> {
        &self.indices
    }
}
