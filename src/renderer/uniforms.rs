// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

pub const DEFAULT_GRASS_COLOR: [f32; 4] = [0.53, 0.8, 0.31, 1.0];
pub const DEFAULT_DIRT_COLOR: [f32; 4] = [0.51, 0.43, 0.3, 1.0];

pub fn default_light_direction() -> Vec3 {
    Vec3::new(-1.0, -1.0, -1.0).normalize()
}

/// Per-frame record read by the tile program at uniform binding 0.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct PerFrameData {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub grass_color: [f32; 4],
    pub dirt_color: [f32; 4],
    pub light_direction: [f32; 4],
    /// x: seconds since start, yzw unused.
    pub animation: [f32; 4],
}

impl PerFrameData {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            grass_color: DEFAULT_GRASS_COLOR,
            dirt_color: DEFAULT_DIRT_COLOR,
            light_direction: default_light_direction().extend(1.0).to_array(),
            animation: [0.0; 4],
        }
    }

    pub fn with_colors(mut self, grass: Vec4, dirt: Vec4) -> Self {
        self.grass_color = grass.to_array();
        self.dirt_color = dirt.to_array();
        self
    }

    pub fn with_light_direction(mut self, direction: Vec3) -> Self {
        self.light_direction = direction.normalize_or_zero().extend(1.0).to_array();
        self
    }

    pub fn with_time(mut self, seconds: f32) -> Self {
        self.animation[0] = seconds;
        self
    }
}

impl Default for PerFrameData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct DebugPerFrameData {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl DebugPerFrameData {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}
