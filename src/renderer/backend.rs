//! The seam between the buffer layer and a graphics API.
//!
//! Everything above this trait pair (typed buffers, object arrays, the
//! indirect command batch, the tile registry) is written once against
//! [`GpuBackend`] and [`RenderRecorder`]. The wgpu implementation lives in
//! `internal::wgpu_backend`, the headless one in [`crate::renderer::recording`].

use std::ops::Range;

use crate::renderer::bindings::BindingSlot;

/// What a buffer is created for. Every buffer is also a copy destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Uniform,
    Storage,
    Vertex,
    Index,
    Indirect,
}

pub trait BackendBuffer {
    /// Hands the allocation back before the handle drops. Called exactly
    /// once, by the owning [`crate::renderer::GpuBuffer`].
    fn release(&self);
}

/// A buffer bound to one slot of a bind group.
pub struct BufferBinding<'a, B: GpuBackend> {
    pub slot: BindingSlot,
    pub buffer: &'a B::Buffer,
}

pub trait GpuBackend: Sized {
    type Buffer: BackendBuffer;
    type BindGroupLayout;
    type BindGroup;
    type Program;

    /// Allocates `size` zero-initialised bytes.
    fn create_buffer(&self, label: &str, target: BufferTarget, size: u64) -> Self::Buffer;

    fn create_buffer_init(&self, label: &str, target: BufferTarget, contents: &[u8])
        -> Self::Buffer;

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    fn create_bind_group_layout(&self, label: &str, slots: &[BindingSlot])
        -> Self::BindGroupLayout;

    fn create_bind_group(
        &self,
        label: &str,
        layout: &Self::BindGroupLayout,
        bindings: &[BufferBinding<'_, Self>],
    ) -> Self::BindGroup;
}

/// Draw-side calls, recorded into a pass. Indices are always `u32`.
pub trait RenderRecorder<B: GpuBackend> {
    fn set_program(&mut self, program: &B::Program);

    fn set_bind_group(&mut self, group: u32, bind_group: &B::BindGroup);

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &B::Buffer);

    fn set_index_buffer(&mut self, buffer: &B::Buffer);

    /// Issues `count` indexed draws described by consecutive commands at the
    /// start of `indirect`.
    fn multi_draw_indexed_indirect(&mut self, indirect: &B::Buffer, count: u32);

    fn draw(&mut self, vertices: Range<u32>);
}
