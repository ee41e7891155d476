// renderer/debug_lines.rs
use glam::Vec3;

use crate::renderer::array_buffer::ObjectArrayBuffer;
use crate::renderer::backend::{BufferTarget, GpuBackend, RenderRecorder};
use crate::renderer::bindings::{DEBUG_FRAME_SLOTS, FRAME_GROUP, PER_FRAME};
use crate::renderer::buffer::MutableBuffer;
use crate::renderer::uniforms::DebugPerFrameData;
use crate::renderer::vertex::DebugVertex;

pub const MAX_DEBUG_VERTICES: usize = 1024 * 1024;

/// Immediate-mode line overlay. Lines added during a frame are drawn once by
/// [`DebugLines::draw`] and then forgotten.
pub struct DebugLines<B: GpuBackend> {
    vertices: ObjectArrayBuffer<B, DebugVertex, MAX_DEBUG_VERTICES>,
    per_frame: MutableBuffer<B, DebugPerFrameData>,
    layout: B::BindGroupLayout,
    bind_group: B::BindGroup,
}

impl<B: GpuBackend> DebugLines<B> {
    pub fn new(backend: &B) -> Self {
        let vertices = ObjectArrayBuffer::new(backend, "Debug Vertices", BufferTarget::Vertex);
        let per_frame = MutableBuffer::new(backend, "Debug Per-Frame Data", BufferTarget::Uniform);
        let layout = backend.create_bind_group_layout("Debug Frame Layout", &DEBUG_FRAME_SLOTS);
        let bind_group = backend.create_bind_group(
            "Debug Frame Bind Group",
            &layout,
            &[per_frame.bind(PER_FRAME)],
        );
        Self {
            vertices,
            per_frame,
            layout,
            bind_group,
        }
    }

    pub fn set_per_frame_data(&self, backend: &B, data: &DebugPerFrameData) {
        self.per_frame.update(backend, data);
    }

    pub fn add_line(&mut self, from: Vec3, to: Vec3, color: Vec3) {
        let color = color.to_array();
        self.vertices.add(DebugVertex {
            pos: from.to_array(),
            color,
        });
        self.vertices.add(DebugVertex {
            pos: to.to_array(),
            color,
        });
    }

    /// Red, green and blue unit lines through `center` along X, Y and Z.
    pub fn add_axes(&mut self, center: Vec3) {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            self.add_line(center - axis, center + axis, axis);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn layout(&self) -> &B::BindGroupLayout {
        &self.layout
    }

    /// Uploads this frame's lines, draws them as a line list and clears them.
    pub fn draw<R: RenderRecorder<B>>(&mut self, backend: &B, pass: &mut R, program: &B::Program) {
        if self.vertices.is_empty() {
            return;
        }
        self.vertices.upload(backend);
        log::debug!("Drawing {} debug lines", self.vertices.len() / 2);

        pass.set_program(program);
        pass.set_bind_group(FRAME_GROUP, &self.bind_group);
        pass.set_vertex_buffer(0, self.vertices.buffer().raw());
        pass.draw(0..self.vertices.len() as u32);

        self.vertices.clear();
    }
}
