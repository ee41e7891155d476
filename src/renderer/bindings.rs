//! Fixed binding-point table shared by every program this crate drives.
//!
//! Binding indices are one namespace per bind group, so the table lives in
//! a single place and both the buffer owners and the WGSL sources agree on
//! it:
//!
//! | group | binding | class   | contents               |
//! |-------|---------|---------|------------------------|
//! | 0     | 0       | uniform | per-frame record       |
//! | 0     | 1       | storage | tile instance table    |
//! | 0     | 2       | storage | tile template table    |
//! | 1     | 0..1    | texture | texture array, sampler |

use crate::renderer::backend::BufferTarget;

pub const FRAME_GROUP: u32 = 0;
pub const TEXTURE_GROUP: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingClass {
    Uniform,
    Storage,
}

impl BindingClass {
    /// Whether a buffer created for `target` may be bound to this class.
    pub fn accepts(self, target: BufferTarget) -> bool {
        matches!(
            (self, target),
            (Self::Uniform, BufferTarget::Uniform) | (Self::Storage, BufferTarget::Storage)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub index: u32,
    pub class: BindingClass,
}

impl BindingSlot {
    pub const fn uniform(index: u32) -> Self {
        Self {
            index,
            class: BindingClass::Uniform,
        }
    }

    pub const fn storage(index: u32) -> Self {
        Self {
            index,
            class: BindingClass::Storage,
        }
    }
}

pub const PER_FRAME: BindingSlot = BindingSlot::uniform(0);
pub const TILES: BindingSlot = BindingSlot::storage(1);
pub const TILE_TEMPLATES: BindingSlot = BindingSlot::storage(2);

pub const TILE_FRAME_SLOTS: [BindingSlot; 3] = [PER_FRAME, TILES, TILE_TEMPLATES];
pub const DEBUG_FRAME_SLOTS: [BindingSlot; 1] = [PER_FRAME];

/// Panics when two slots of one layout share a binding index.
pub fn assert_unique_slots(label: &str, slots: &[BindingSlot]) {
    for (position, slot) in slots.iter().enumerate() {
        assert!(
            slots[..position].iter().all(|other| other.index != slot.index),
            "layout '{}' binds index {} twice",
            label,
            slot.index
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_frame_table_matches_shader_contract() {
        assert_eq!(PER_FRAME.index, 0);
        assert_eq!(PER_FRAME.class, BindingClass::Uniform);
        assert_eq!(TILES.index, 1);
        assert_eq!(TILES.class, BindingClass::Storage);
        assert_eq!(TILE_TEMPLATES.index, 2);
        assert_eq!(TILE_TEMPLATES.class, BindingClass::Storage);
        assert_unique_slots("TileFrame", &TILE_FRAME_SLOTS);
    }

    #[test]
    fn classes_only_accept_matching_targets() {
        assert!(BindingClass::Uniform.accepts(BufferTarget::Uniform));
        assert!(BindingClass::Storage.accepts(BufferTarget::Storage));
        assert!(!BindingClass::Storage.accepts(BufferTarget::Uniform));
        assert!(!BindingClass::Uniform.accepts(BufferTarget::Indirect));
    }

    #[test]
    #[should_panic(expected = "binds index 1 twice")]
    fn duplicate_indices_are_rejected() {
        assert_unique_slots("Broken", &[TILES, BindingSlot::uniform(1)]);
    }
}
