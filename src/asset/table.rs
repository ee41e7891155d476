use super::Handle;

/// Append-only table with a fixed number of slots, addressed by dense
/// [`Handle`]s. Slot numbers are what the GPU side indexes with, so an
/// item's handle never changes until the table is cleared.
pub struct SlotTable<T> {
    label: &'static str,
    limit: usize,
    items: Vec<T>,
}

impl<T> SlotTable<T> {
    pub fn new(label: &'static str, limit: usize) -> Self {
        Self {
            label,
            limit,
            items: Vec::new(),
        }
    }

    /// Stores `item` in the next free slot. Panics when every slot is taken.
    pub fn insert(&mut self, item: T) -> Handle<T> {
        assert!(
            !self.is_full(),
            "'{}' is full: {} of {} slots",
            self.label,
            self.items.len(),
            self.limit
        );
        let index = self.items.len();
        self.items.push(item);
        Handle::new(index)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    /// Items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Drops every item. Handles issued before the call become dangling and
    /// slot numbering restarts at zero.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
