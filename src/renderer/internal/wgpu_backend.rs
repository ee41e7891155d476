use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::renderer::backend::{
    BackendBuffer, BufferBinding, BufferTarget, GpuBackend, RenderRecorder,
};
use crate::renderer::bindings::{assert_unique_slots, BindingClass, BindingSlot};

/// [`GpuBackend`] over a wgpu device and queue.
#[derive(Clone)]
pub struct WgpuBackend {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

fn usage_for(target: BufferTarget) -> wgpu::BufferUsages {
    let usage = match target {
        BufferTarget::Uniform => wgpu::BufferUsages::UNIFORM,
        BufferTarget::Storage => wgpu::BufferUsages::STORAGE,
        BufferTarget::Vertex => wgpu::BufferUsages::VERTEX,
        BufferTarget::Index => wgpu::BufferUsages::INDEX,
        BufferTarget::Indirect => wgpu::BufferUsages::INDIRECT,
    };
    usage | wgpu::BufferUsages::COPY_DST
}

fn binding_type(class: BindingClass) -> wgpu::BindingType {
    let ty = match class {
        BindingClass::Uniform => wgpu::BufferBindingType::Uniform,
        BindingClass::Storage => wgpu::BufferBindingType::Storage { read_only: true },
    };
    wgpu::BindingType::Buffer {
        ty,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

// Dropping the last `wgpu::Buffer` handle frees it once every submitted use
// completes. `destroy()` would also invalidate recorded but unsubmitted work.
impl BackendBuffer for wgpu::Buffer {
    fn release(&self) {}
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type BindGroupLayout = wgpu::BindGroupLayout;
    type BindGroup = wgpu::BindGroup;
    type Program = wgpu::RenderPipeline;

    fn create_buffer(&self, label: &str, target: BufferTarget, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage_for(target),
            mapped_at_creation: false,
        })
    }

    fn create_buffer_init(
        &self,
        label: &str,
        target: BufferTarget,
        contents: &[u8],
    ) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usage_for(target),
            })
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn create_bind_group_layout(&self, label: &str, slots: &[BindingSlot]) -> wgpu::BindGroupLayout {
        assert_unique_slots(label, slots);
        let entries: Vec<wgpu::BindGroupLayoutEntry> = slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.index,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: binding_type(slot.class),
                count: None,
            })
            .collect();
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &entries,
            })
    }

    fn create_bind_group(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        bindings: &[BufferBinding<'_, Self>],
    ) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = bindings
            .iter()
            .map(|binding| wgpu::BindGroupEntry {
                binding: binding.slot.index,
                resource: binding.buffer.as_entire_binding(),
            })
            .collect();
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }
}

impl RenderRecorder<WgpuBackend> for wgpu::RenderPass<'_> {
    fn set_program(&mut self, program: &wgpu::RenderPipeline) {
        wgpu::RenderPass::set_pipeline(self, program);
    }

    fn set_bind_group(&mut self, group: u32, bind_group: &wgpu::BindGroup) {
        wgpu::RenderPass::set_bind_group(self, group, bind_group, &[]);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer) {
        wgpu::RenderPass::set_vertex_buffer(self, slot, buffer.slice(..));
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer) {
        wgpu::RenderPass::set_index_buffer(self, buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn multi_draw_indexed_indirect(&mut self, indirect: &wgpu::Buffer, count: u32) {
        wgpu::RenderPass::multi_draw_indexed_indirect(self, indirect, 0, count);
    }

    fn draw(&mut self, vertices: Range<u32>) {
        wgpu::RenderPass::draw(self, vertices, 0..1);
    }
}
