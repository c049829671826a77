//! Desired state of output peripherals.

use crate::cache::display::Line;

/// Desired state of output peripherals with the exception of MIDI.
///
/// This structure transfers requests to the display wrapper, asking to show
/// two lines of text.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DesiredOutput {
    pub lines: [Line; 2],
}
