// renderer/array_buffer.rs
use std::mem;

use bytemuck::{Pod, Zeroable};

use crate::renderer::backend::{BufferTarget, GpuBackend};
use crate::renderer::buffer::GpuBuffer;

/// An ordered CPU list of records mirrored into one fixed-size device buffer.
///
/// Appends only touch the CPU list. [`ObjectArrayBuffer::upload`] copies the
/// live range `[0, len * size_of::<T>())` to the start of the device buffer
/// in one transfer; bytes past the live range keep whatever an earlier upload
/// left there, so readers must never look past `len`.
pub struct ObjectArrayBuffer<B: GpuBackend, T: Pod, const MAX: usize> {
    buffer: GpuBuffer<B>,
    objects: Vec<T>,
    synced: bool,
}

impl<B: GpuBackend, T: Pod, const MAX: usize> ObjectArrayBuffer<B, T, MAX> {
    pub const CAPACITY_BYTES: u64 = (MAX * mem::size_of::<T>()) as u64;

    pub fn new(backend: &B, label: &str, target: BufferTarget) -> Self {
        log::info!(
            "Allocating '{}': {} x {} bytes",
            label,
            MAX,
            mem::size_of::<T>()
        );
        Self {
            buffer: GpuBuffer::new(backend, label, target, Self::CAPACITY_BYTES),
            objects: Vec::new(),
            synced: true,
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.synced = false;
    }

    pub fn add(&mut self, object: T) {
        self.check_room();
        self.objects.push(object);
        self.synced = false;
    }

    /// Appends a zeroed record and hands it back for filling in.
    pub fn add_zeroed(&mut self) -> &mut T {
        self.check_room();
        let index = self.objects.len();
        self.objects.push(T::zeroed());
        self.synced = false;
        &mut self.objects[index]
    }

    /// Copies the live records to the device. Empty lists issue no transfer.
    pub fn upload(&mut self, backend: &B) {
        if !self.objects.is_empty() {
            self.buffer
                .write(backend, 0, bytemuck::cast_slice(&self.objects));
        }
        self.synced = true;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// True when the device holds exactly the current live range.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn as_slice(&self) -> &[T] {
        &self.objects
    }

    pub fn buffer(&self) -> &GpuBuffer<B> {
        &self.buffer
    }

    fn check_room(&self) {
        assert!(
            self.objects.len() < MAX,
            "'{}' is full: {} of {} records",
            self.buffer.label(),
            self.objects.len(),
            MAX
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::RecordingBackend;

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
    struct Marker {
        id: u32,
        weight: f32,
    }

    fn marker(id: u32) -> Marker {
        Marker {
            id,
            weight: id as f32 * 0.5,
        }
    }

    #[test]
    fn count_tracks_appends_and_upload_preserves_order() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 8> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);

        for id in 0..8 {
            array.add(marker(id));
        }
        assert_eq!(array.len(), 8);

        array.upload(&backend);
        let expected: Vec<Marker> = (0..8).map(marker).collect();
        assert_eq!(array.buffer().raw().read::<Marker>(8), expected);
    }

    #[test]
    fn every_length_up_to_capacity_reads_back_in_order() {
        const MAX: usize = 6;
        for length in 0..=MAX {
            let backend = RecordingBackend::new();
            let mut array: ObjectArrayBuffer<_, Marker, MAX> =
                ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
            for id in 0..length as u32 {
                array.add(marker(id));
            }
            assert_eq!(array.len(), length);

            array.upload(&backend);
            let expected: Vec<Marker> = (0..length as u32).map(marker).collect();
            assert_eq!(array.buffer().raw().read::<Marker>(length), expected);
        }
    }

    #[test]
    #[should_panic(expected = "is full: 4 of 4 records")]
    fn append_past_capacity_fails() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 4> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        for id in 0..5 {
            array.add(marker(id));
        }
    }

    #[test]
    #[should_panic(expected = "is full")]
    fn zeroed_append_past_capacity_fails() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 1> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        array.add_zeroed().id = 1;
        array.add_zeroed();
    }

    #[test]
    fn add_zeroed_returns_the_new_record() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 4> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        array.add(marker(1));
        let slot = array.add_zeroed();
        assert_eq!(*slot, Marker::zeroed());
        slot.id = 42;
        assert_eq!(array.as_slice()[1].id, 42);
    }

    #[test]
    fn upload_writes_only_the_live_range() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 16> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        for id in 0..3 {
            array.add(marker(id));
        }
        array.upload(&backend);

        let writes = backend.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].offset, 0);
        assert_eq!(writes[0].len, 3 * mem::size_of::<Marker>() as u64);
    }

    #[test]
    fn shrinking_leaves_a_stale_tail_on_the_device() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 4> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        for id in 1..=3 {
            array.add(marker(id));
        }
        array.upload(&backend);

        array.clear();
        array.add(marker(9));
        array.upload(&backend);

        let device = array.buffer().raw().read::<Marker>(3);
        assert_eq!(device[0], marker(9));
        assert_eq!(device[1], marker(2));
        assert_eq!(device[2], marker(3));
    }

    #[test]
    fn empty_upload_is_a_no_op() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 4> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        array.upload(&backend);
        array.upload(&backend);
        assert!(backend.writes().is_empty());
        assert!(array.is_synced());
    }

    #[test]
    fn appends_mark_the_mirror_stale() {
        let backend = RecordingBackend::new();
        let mut array: ObjectArrayBuffer<_, Marker, 4> =
            ObjectArrayBuffer::new(&backend, "Markers", BufferTarget::Storage);
        array.add(marker(0));
        assert!(!array.is_synced());
        array.upload(&backend);
        assert!(array.is_synced());
        array.clear();
        assert!(!array.is_synced());
    }
}
