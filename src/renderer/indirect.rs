// renderer/indirect.rs
use bytemuck::{Pod, Zeroable};

use crate::renderer::array_buffer::ObjectArrayBuffer;
use crate::renderer::backend::{BufferTarget, GpuBackend, RenderRecorder};
use crate::renderer::buffer::GpuBuffer;

/// One indexed draw, laid out the way the device reads indirect arguments.
///
/// `first_instance` is what lets the vertex shader find its instance
/// record: `@builtin(instance_index)` starts counting from it.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
pub struct DrawIndexedIndirectCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

/// A batch of indirect commands issued with a single multi-draw call.
pub struct IndirectCommandBuffer<B: GpuBackend, const MAX: usize> {
    commands: ObjectArrayBuffer<B, DrawIndexedIndirectCommand, MAX>,
}

impl<B: GpuBackend, const MAX: usize> IndirectCommandBuffer<B, MAX> {
    pub fn new(backend: &B, label: &str) -> Self {
        Self {
            commands: ObjectArrayBuffer::new(backend, label, BufferTarget::Indirect),
        }
    }

    pub fn add_command(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        base_instance: u32,
    ) {
        let command = self.commands.add_zeroed();
        command.index_count = index_count;
        command.instance_count = instance_count;
        command.first_index = first_index;
        command.base_vertex = base_vertex;
        command.first_instance = base_instance;
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn upload(&mut self, backend: &B) {
        self.commands.upload(backend);
    }

    /// Issues every live command, in append order, as one multi-draw.
    pub fn draw<R: RenderRecorder<B>>(&self, pass: &mut R) {
        assert!(
            self.commands.is_synced(),
            "'{}' drawn with {} commands that were never uploaded",
            self.commands.buffer().label(),
            self.commands.len()
        );
        let count = self.commands.len() as u32;
        if count == 0 {
            return;
        }
        pass.multi_draw_indexed_indirect(self.commands.buffer().raw(), count);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[DrawIndexedIndirectCommand] {
        self.commands.as_slice()
    }

    pub fn buffer(&self) -> &GpuBuffer<B> {
        self.commands.buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{RecordingBackend, RecordingPass, RecordingProgram};

    #[test]
    fn command_is_20_bytes() {
        assert_eq!(std::mem::size_of::<DrawIndexedIndirectCommand>(), 20);
    }

    #[test]
    fn one_call_issues_every_command_in_order() {
        let backend = RecordingBackend::new();
        let mut commands: IndirectCommandBuffer<_, 64> =
            IndirectCommandBuffer::new(&backend, "Commands");
        let base_instances = [7, 3, 11, 0, 5];
        for &base in &base_instances {
            commands.add_command(18, 1, 0, 0, base);
        }
        commands.upload(&backend);

        let mut pass = RecordingPass::new();
        pass.set_program(&RecordingProgram::new("Tiles"));
        commands.draw(&mut pass);

        assert_eq!(pass.multi_draw_calls(), 1);
        let issued = pass.issued_draws();
        assert_eq!(issued.len(), base_instances.len());
        for (draw, &base) in issued.iter().zip(&base_instances) {
            assert_eq!(draw.first_instance, base);
            assert_eq!(draw.index_count, 18);
            assert_eq!(draw.instance_count, 1);
        }
    }

    #[test]
    fn empty_batch_issues_nothing() {
        let backend = RecordingBackend::new();
        let mut commands: IndirectCommandBuffer<_, 4> =
            IndirectCommandBuffer::new(&backend, "Commands");
        commands.upload(&backend);

        let mut pass = RecordingPass::new();
        pass.set_program(&RecordingProgram::new("Tiles"));
        commands.draw(&mut pass);

        assert_eq!(pass.multi_draw_calls(), 0);
        assert!(pass.issued_draws().is_empty());
    }

    #[test]
    #[should_panic(expected = "never uploaded")]
    fn drawing_stale_commands_fails() {
        let backend = RecordingBackend::new();
        let mut commands: IndirectCommandBuffer<_, 4> =
            IndirectCommandBuffer::new(&backend, "Commands");
        commands.add_command(18, 1, 0, 0, 0);

        let mut pass = RecordingPass::new();
        pass.set_program(&RecordingProgram::new("Tiles"));
        commands.draw(&mut pass);
    }

    #[test]
    fn add_command_fills_every_field() {
        let backend = RecordingBackend::new();
        let mut commands: IndirectCommandBuffer<_, 4> =
            IndirectCommandBuffer::new(&backend, "Commands");
        commands.add_command(6, 2, 12, -4, 9);
        assert_eq!(
            commands.as_slice(),
            &[DrawIndexedIndirectCommand {
                index_count: 6,
                instance_count: 2,
                first_index: 12,
                base_vertex: -4,
                first_instance: 9,
            }]
        );
    }
}
