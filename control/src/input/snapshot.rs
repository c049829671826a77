//! Structures used to pass the current state of hardware peripherals.

use crate::BUTTON_COUNT;

/// The current state of all peripherals.
///
/// `Snapshot` is meant to be passed from the hardware binding to the control
/// package once per poll. It should pass pretty raw data, with two
/// exceptions:
///
/// 1. Button debouncing is done by the caller.
/// 2. The timestamp is read once per poll from a monotonic millisecond
///    clock. It is allowed to wrap around.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub timestamp: u32,
    pub buttons: [bool; BUTTON_COUNT],
}
