//! A headless [`GpuBackend`] that keeps buffer contents in memory.
//!
//! Buffers can be read back byte for byte, every `write_buffer` call is
//! logged, and [`RecordingPass`] expands each multi-draw into the individual
//! draws decoded from its indirect buffer. Used by the test suites and by
//! anything that wants to inspect what a frame would submit without a device.

use std::cell::{Cell, RefCell};
use std::mem;
use std::ops::Range;
use std::rc::Rc;

use bytemuck::Pod;

use crate::renderer::backend::{
    BackendBuffer, BufferBinding, BufferTarget, GpuBackend, RenderRecorder,
};
use crate::renderer::bindings::{assert_unique_slots, BindingSlot};
use crate::renderer::indirect::DrawIndexedIndirectCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWrite {
    pub buffer: u64,
    pub offset: u64,
    pub len: u64,
}

#[derive(Default)]
struct RecordingState {
    next_buffer_id: u64,
    live_buffers: usize,
    released_buffers: usize,
    writes: Vec<BufferWrite>,
}

#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().live_buffers
    }

    pub fn released_buffers(&self) -> usize {
        self.state.borrow().released_buffers
    }

    /// Every `write_buffer` call so far, oldest first.
    pub fn writes(&self) -> Vec<BufferWrite> {
        self.state.borrow().writes.clone()
    }

    fn allocate(&self, label: &str, target: BufferTarget, size: u64) -> RecordingBuffer {
        let mut state = self.state.borrow_mut();
        let id = state.next_buffer_id;
        state.next_buffer_id += 1;
        state.live_buffers += 1;
        RecordingBuffer {
            id,
            label: label.to_owned(),
            target,
            size,
            contents: RefCell::new(Vec::new()),
            released: Cell::new(false),
            state: Rc::clone(&self.state),
        }
    }
}

/// In-memory buffer. Storage grows lazily as bytes are written; unwritten
/// bytes read back as zero.
pub struct RecordingBuffer {
    id: u64,
    label: String,
    target: BufferTarget,
    size: u64,
    contents: RefCell<Vec<u8>>,
    released: Cell<bool>,
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingBuffer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn bytes(&self, range: Range<u64>) -> Vec<u8> {
        assert!(
            range.end <= self.size,
            "readback {:?} overruns '{}' ({} bytes)",
            range,
            self.label,
            self.size
        );
        let contents = self.contents.borrow();
        (range.start..range.end)
            .map(|index| contents.get(index as usize).copied().unwrap_or(0))
            .collect()
    }

    /// Reads the first `count` records of type `T`.
    pub fn read<T: Pod>(&self, count: usize) -> Vec<T> {
        let stride = mem::size_of::<T>();
        let bytes = self.bytes(0..(count * stride) as u64);
        bytes
            .chunks_exact(stride)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    fn write(&self, offset: u64, data: &[u8]) {
        assert!(
            !self.released.get(),
            "write to released buffer '{}'",
            self.label
        );
        let end = offset + data.len() as u64;
        assert!(
            end <= self.size,
            "write {}..{} overruns '{}' ({} bytes)",
            offset,
            end,
            self.label,
            self.size
        );
        let mut contents = self.contents.borrow_mut();
        if contents.len() < end as usize {
            contents.resize(end as usize, 0);
        }
        contents[offset as usize..end as usize].copy_from_slice(data);
    }
}

impl BackendBuffer for RecordingBuffer {
    fn release(&self) {
        assert!(
            !self.released.replace(true),
            "buffer '{}' released twice",
            self.label
        );
        let mut state = self.state.borrow_mut();
        state.live_buffers -= 1;
        state.released_buffers += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingLayout {
    pub label: String,
    pub slots: Vec<BindingSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingBindGroup {
    pub label: String,
    pub entries: Vec<(BindingSlot, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingProgram {
    pub label: String,
}

impl RecordingProgram {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
        }
    }
}

impl GpuBackend for RecordingBackend {
    type Buffer = RecordingBuffer;
    type BindGroupLayout = RecordingLayout;
    type BindGroup = RecordingBindGroup;
    type Program = RecordingProgram;

    fn create_buffer(&self, label: &str, target: BufferTarget, size: u64) -> RecordingBuffer {
        self.allocate(label, target, size)
    }

    fn create_buffer_init(
        &self,
        label: &str,
        target: BufferTarget,
        contents: &[u8],
    ) -> RecordingBuffer {
        let buffer = self.allocate(label, target, contents.len() as u64);
        buffer.write(0, contents);
        buffer
    }

    fn write_buffer(&self, buffer: &RecordingBuffer, offset: u64, data: &[u8]) {
        buffer.write(offset, data);
        self.state.borrow_mut().writes.push(BufferWrite {
            buffer: buffer.id,
            offset,
            len: data.len() as u64,
        });
    }

    fn create_bind_group_layout(&self, label: &str, slots: &[BindingSlot]) -> RecordingLayout {
        assert_unique_slots(label, slots);
        RecordingLayout {
            label: label.to_owned(),
            slots: slots.to_vec(),
        }
    }

    fn create_bind_group(
        &self,
        label: &str,
        layout: &RecordingLayout,
        bindings: &[BufferBinding<'_, Self>],
    ) -> RecordingBindGroup {
        assert_eq!(
            bindings.len(),
            layout.slots.len(),
            "bind group '{}' does not fill layout '{}'",
            label,
            layout.label
        );
        for binding in bindings {
            assert!(
                layout.slots.contains(&binding.slot),
                "bind group '{}' uses {:?}, which layout '{}' does not declare",
                label,
                binding.slot,
                layout.label
            );
        }
        RecordingBindGroup {
            label: label.to_owned(),
            entries: bindings
                .iter()
                .map(|binding| (binding.slot, binding.buffer.id))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassCommand {
    SetProgram(String),
    SetBindGroup {
        group: u32,
        bind_group: RecordingBindGroup,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: u64,
    },
    SetIndexBuffer {
        buffer: u64,
    },
    MultiDrawIndexedIndirect {
        buffer: u64,
        count: u32,
        draws: Vec<DrawIndexedIndirectCommand>,
    },
    Draw {
        vertices: Range<u32>,
    },
}

/// Records draw-side calls. Draws issued before any program is set panic.
#[derive(Debug, Default)]
pub struct RecordingPass {
    commands: Vec<PassCommand>,
    program: Option<String>,
}

impl RecordingPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PassCommand] {
        &self.commands
    }

    pub fn multi_draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, PassCommand::MultiDrawIndexedIndirect { .. }))
            .count()
    }

    /// Every indexed draw issued through multi-draws, in issue order.
    pub fn issued_draws(&self) -> Vec<DrawIndexedIndirectCommand> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PassCommand::MultiDrawIndexedIndirect { draws, .. } => Some(draws.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// The bind group most recently set at `group`.
    pub fn bound_group(&self, group: u32) -> Option<&RecordingBindGroup> {
        self.commands.iter().rev().find_map(|command| match command {
            PassCommand::SetBindGroup {
                group: bound,
                bind_group,
            } if *bound == group => Some(bind_group),
            _ => None,
        })
    }

    fn require_program(&self, call: &str) {
        assert!(self.program.is_some(), "{} issued with no program bound", call);
    }
}

impl RenderRecorder<RecordingBackend> for RecordingPass {
    fn set_program(&mut self, program: &RecordingProgram) {
        self.program = Some(program.label.clone());
        self.commands
            .push(PassCommand::SetProgram(program.label.clone()));
    }

    fn set_bind_group(&mut self, group: u32, bind_group: &RecordingBindGroup) {
        self.commands.push(PassCommand::SetBindGroup {
            group,
            bind_group: bind_group.clone(),
        });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &RecordingBuffer) {
        self.commands.push(PassCommand::SetVertexBuffer {
            slot,
            buffer: buffer.id,
        });
    }

    fn set_index_buffer(&mut self, buffer: &RecordingBuffer) {
        self.commands
            .push(PassCommand::SetIndexBuffer { buffer: buffer.id });
    }

    fn multi_draw_indexed_indirect(&mut self, indirect: &RecordingBuffer, count: u32) {
        self.require_program("multi_draw_indexed_indirect");
        let draws = indirect.read::<DrawIndexedIndirectCommand>(count as usize);
        self.commands.push(PassCommand::MultiDrawIndexedIndirect {
            buffer: indirect.id,
            count,
            draws,
        });
    }

    fn draw(&mut self, vertices: Range<u32>) {
        self.require_program("draw");
        self.commands.push(PassCommand::Draw { vertices });
    }
}
