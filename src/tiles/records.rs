// tiles/records.rs
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Texture slot value for a template with no texture bound.
pub const INVALID_TEXTURE_SLOT: u32 = u32::MAX;

/// One placed tile, as the vertex shader reads it from storage binding 1.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TileData {
    /// xyz map position, w always 1.
    pub position: [f32; 4],
    pub template_index: u32,
    pub variant_index: u32,
    pub _padding: [u32; 2],
}

impl TileData {
    pub fn new(position: Vec3, template_index: u32, variant_index: u32) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            template_index,
            variant_index,
            _padding: [0; 2],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// Shared per-template record at storage binding 2.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TileTemplateData {
    pub texture_slot: u32,
    pub variant_count: u32,
    pub animation_frame_count: u32,
    pub frame_duration: f32,
}

impl Default for TileTemplateData {
    fn default() -> Self {
        Self {
            texture_slot: INVALID_TEXTURE_SLOT,
            variant_count: 1,
            animation_frame_count: 1,
            frame_duration: 0.0,
        }
    }
}
