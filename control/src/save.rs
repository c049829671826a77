//! Persistent preset grid and its byte image.

use crate::{BUTTON_COUNT, PAGE_COUNT};

/// Signature stamped right after the grid bytes. Its presence marks the
/// backing store as initialized; anything else is treated as blank.
pub const SIGNATURE: [u8; 6] = *b"STOMP1";

/// Size of the persistent image: one byte per grid slot, then the signature.
pub const IMAGE_SIZE: usize = PAGE_COUNT * BUTTON_COUNT + SIGNATURE.len();

/// Request to persist a single slot byte.
///
/// Produced by the store only when the committed value differs from the
/// byte already persisted at the slot's address, keeping writes to the
/// backing medium at a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotWrite {
    pub address: usize,
    pub value: u8,
}

/// The backing image does not carry the signature.
pub struct BlankImage;

/// Grid of preset values, one per page and button.
///
/// Owned by the control store's cache. Mutated only by edit commits and by
/// the identity default of a first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresetGrid {
    slots: [[u8; BUTTON_COUNT]; PAGE_COUNT],
}

impl Default for PresetGrid {
    /// Identity default: slot (page, button) holds its own linear address.
    fn default() -> Self {
        let mut slots = [[0; BUTTON_COUNT]; PAGE_COUNT];
        for (page, buttons) in slots.iter_mut().enumerate() {
            for (button, slot) in buttons.iter_mut().enumerate() {
                *slot = Self::address(page, button).min(127) as u8;
            }
        }
        Self { slots }
    }
}

impl PresetGrid {
    /// Linear address of a slot in the persistent image.
    #[must_use]
    pub const fn address(page: usize, button: usize) -> usize {
        page * BUTTON_COUNT + button
    }

    #[must_use]
    pub fn preset(&self, page: usize, button: usize) -> u8 {
        self.slots[page][button]
    }

    pub fn set_preset(&mut self, page: usize, button: usize, value: u8) {
        self.slots[page][button] = value;
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; IMAGE_SIZE] {
        let mut bytes = [0; IMAGE_SIZE];
        for (page, buttons) in self.slots.iter().enumerate() {
            for (button, slot) in buttons.iter().enumerate() {
                bytes[Self::address(page, button)] = *slot;
            }
        }
        bytes[IMAGE_SIZE - SIGNATURE.len()..].copy_from_slice(&SIGNATURE);
        bytes
    }

    /// # Errors
    ///
    /// This fails with `BlankImage` when the image does not end with the
    /// signature. Slot contents of a signed image are loaded verbatim.
    pub fn from_bytes(bytes: [u8; IMAGE_SIZE]) -> Result<Self, BlankImage> {
        if bytes[IMAGE_SIZE - SIGNATURE.len()..] != SIGNATURE {
            return Err(BlankImage);
        }

        let mut slots = [[0; BUTTON_COUNT]; PAGE_COUNT];
        for (page, buttons) in slots.iter_mut().enumerate() {
            for (button, slot) in buttons.iter_mut().enumerate() {
                *slot = bytes[Self::address(page, button)];
            }
        }
        Ok(Self { slots })
    }
}
