// renderer/buffer.rs
use std::marker::PhantomData;
use std::mem;

use bytemuck::Pod;

use crate::renderer::backend::{BackendBuffer, BufferBinding, BufferTarget, GpuBackend};
use crate::renderer::bindings::BindingSlot;

/// Copy offsets and sizes handed to the device must be multiples of this.
pub const COPY_ALIGNMENT: u64 = 4;

/// Sole owner of one device allocation. Not `Clone`; the allocation is
/// released when the wrapper drops.
pub struct GpuBuffer<B: GpuBackend> {
    raw: B::Buffer,
    label: String,
    target: BufferTarget,
    capacity: u64,
}

impl<B: GpuBackend> GpuBuffer<B> {
    pub fn new(backend: &B, label: &str, target: BufferTarget, capacity: u64) -> Self {
        let raw = backend.create_buffer(label, target, capacity);
        Self {
            raw,
            label: label.to_owned(),
            target,
            capacity,
        }
    }

    pub fn with_contents(backend: &B, label: &str, target: BufferTarget, contents: &[u8]) -> Self {
        let raw = backend.create_buffer_init(label, target, contents);
        Self {
            raw,
            label: label.to_owned(),
            target,
            capacity: contents.len() as u64,
        }
    }

    /// Pairs this buffer with a binding slot for bind group creation.
    pub fn bind(&self, slot: BindingSlot) -> BufferBinding<'_, B> {
        assert!(
            slot.class.accepts(self.target),
            "buffer '{}' ({:?}) cannot be bound to {:?} slot {}",
            self.label,
            self.target,
            slot.class,
            slot.index
        );
        BufferBinding {
            slot,
            buffer: &self.raw,
        }
    }

    pub fn write(&self, backend: &B, offset: u64, data: &[u8]) {
        assert!(
            offset + data.len() as u64 <= self.capacity,
            "write of {} bytes at offset {} overflows buffer '{}' ({} bytes)",
            data.len(),
            offset,
            self.label,
            self.capacity
        );
        backend.write_buffer(&self.raw, offset, data);
    }

    pub fn raw(&self) -> &B::Buffer {
        &self.raw
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

impl<B: GpuBackend> Drop for GpuBuffer<B> {
    fn drop(&mut self) {
        log::debug!("Releasing buffer '{}' ({} bytes)", self.label, self.capacity);
        self.raw.release();
    }
}

/// A buffer sized for exactly one `T`, written once at creation.
pub struct ImmutableBuffer<B: GpuBackend, T: Pod> {
    buffer: GpuBuffer<B>,
    _record: PhantomData<T>,
}

impl<B: GpuBackend, T: Pod> ImmutableBuffer<B, T> {
    pub fn new(backend: &B, label: &str, target: BufferTarget, record: &T) -> Self {
        Self {
            buffer: GpuBuffer::with_contents(backend, label, target, bytemuck::bytes_of(record)),
            _record: PhantomData,
        }
    }

    pub fn bind(&self, slot: BindingSlot) -> BufferBinding<'_, B> {
        self.buffer.bind(slot)
    }

    pub fn buffer(&self) -> &GpuBuffer<B> {
        &self.buffer
    }
}

/// A buffer sized for exactly one `T` that is overwritten in place.
pub struct MutableBuffer<B: GpuBackend, T: Pod> {
    buffer: GpuBuffer<B>,
    _record: PhantomData<T>,
}

impl<B: GpuBackend, T: Pod> MutableBuffer<B, T> {
    pub const SIZE: u64 = mem::size_of::<T>() as u64;

    /// Creates a zeroed buffer.
    pub fn new(backend: &B, label: &str, target: BufferTarget) -> Self {
        Self {
            buffer: GpuBuffer::new(backend, label, target, Self::SIZE),
            _record: PhantomData,
        }
    }

    pub fn with_record(backend: &B, label: &str, target: BufferTarget, record: &T) -> Self {
        Self {
            buffer: GpuBuffer::with_contents(backend, label, target, bytemuck::bytes_of(record)),
            _record: PhantomData,
        }
    }

    /// Replaces the whole record.
    pub fn update(&self, backend: &B, record: &T) {
        self.update_range(backend, 0, bytemuck::bytes_of(record));
    }

    /// Replaces `data.len()` bytes starting at `offset`. The window must lie
    /// inside the record and respect [`COPY_ALIGNMENT`].
    pub fn update_range(&self, backend: &B, offset: u64, data: &[u8]) {
        let size = data.len() as u64;
        assert!(
            offset < Self::SIZE,
            "offset {} is outside '{}' ({} bytes)",
            offset,
            self.buffer.label(),
            Self::SIZE
        );
        assert!(
            offset + size <= Self::SIZE,
            "update of {} bytes at offset {} overruns '{}' ({} bytes)",
            size,
            offset,
            self.buffer.label(),
            Self::SIZE
        );
        assert!(
            offset % COPY_ALIGNMENT == 0 && size % COPY_ALIGNMENT == 0,
            "update of '{}' at offset {} size {} is not {}-byte aligned",
            self.buffer.label(),
            offset,
            size,
            COPY_ALIGNMENT
        );
        self.buffer.write(backend, offset, data);
    }

    pub fn bind(&self, slot: BindingSlot) -> BufferBinding<'_, B> {
        self.buffer.bind(slot)
    }

    pub fn buffer(&self) -> &GpuBuffer<B> {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::bindings::{PER_FRAME, TILES};
    use crate::renderer::recording::RecordingBackend;
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
    struct Sample {
        a: [f32; 4],
        b: [u32; 4],
    }

    #[test]
    fn dropping_a_buffer_releases_it_once() {
        let backend = RecordingBackend::new();
        {
            let _buffer = GpuBuffer::new(&backend, "Scratch", BufferTarget::Storage, 64);
            assert_eq!(backend.live_buffers(), 1);
        }
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.released_buffers(), 1);
    }

    #[test]
    fn new_buffers_read_back_as_zero() {
        let backend = RecordingBackend::new();
        let buffer = GpuBuffer::new(&backend, "Zeroed", BufferTarget::Storage, 16);
        assert_eq!(buffer.raw().bytes(0..16), vec![0u8; 16]);
    }

    #[test]
    fn full_update_replaces_record() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        let record = Sample {
            a: [1.0, 2.0, 3.0, 4.0],
            b: [5, 6, 7, 8],
        };
        buffer.update(&backend, &record);
        assert_eq!(buffer.buffer().raw().read::<Sample>(1), vec![record]);
    }

    #[test]
    fn partial_update_only_touches_its_window() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::with_record(&backend, "Sample", BufferTarget::Uniform, &Sample::zeroed());
        buffer.update_range(&backend, 16, bytemuck::bytes_of(&[9u32, 9]));
        let read = buffer.buffer().raw().read::<Sample>(1)[0];
        assert_eq!(read.a, [0.0; 4]);
        assert_eq!(read.b, [9, 9, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "is outside")]
    fn update_at_capacity_offset_fails() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        buffer.update_range(&backend, 32, &[0u8; 4]);
    }

    #[test]
    #[should_panic(expected = "overruns")]
    fn update_past_the_end_fails() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        buffer.update_range(&backend, 28, &[0u8; 8]);
    }

    #[test]
    #[should_panic(expected = "is not 4-byte aligned")]
    fn unaligned_update_size_fails() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        buffer.update_range(&backend, 0, &[1u8, 2]);
    }

    #[test]
    #[should_panic(expected = "is not 4-byte aligned")]
    fn unaligned_update_offset_fails() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        buffer.update_range(&backend, 2, &[0u8; 4]);
    }

    #[test]
    #[should_panic(expected = "cannot be bound")]
    fn uniform_buffer_rejects_storage_slot() {
        let backend = RecordingBackend::new();
        let buffer: MutableBuffer<_, Sample> =
            MutableBuffer::new(&backend, "Sample", BufferTarget::Uniform);
        let _ = buffer.bind(TILES);
    }

    #[test]
    fn immutable_buffer_holds_initial_record() {
        let backend = RecordingBackend::new();
        let record = Sample {
            a: [0.5; 4],
            b: [1; 4],
        };
        let buffer = ImmutableBuffer::new(&backend, "Fixed", BufferTarget::Uniform, &record);
        let binding = buffer.bind(PER_FRAME);
        assert_eq!(binding.slot, PER_FRAME);
        assert_eq!(buffer.buffer().capacity(), 32);
        assert_eq!(buffer.buffer().raw().read::<Sample>(1), vec![record]);
    }
}
