use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Dense slot index into a [`SlotTable`](super::SlotTable). Handles carry
/// their item type so a template handle cannot index a texture table.
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls so `T` does not need to be `Clone`/`Eq`/`Debug` itself.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.index).finish()
    }
}

impl<T> Handle<T> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NotCopy;

    #[test]
    fn handle_is_copy_for_any_item_type() {
        let h1: Handle<NotCopy> = Handle::new(5);
        let h2 = h1;
        let h3 = h1;
        assert_eq!(h1, h2);
        assert_eq!(h1.index(), h3.index());
        assert_eq!(format!("{:?}", h1), "Handle(5)");
    }
}
