//! Process all input peripherals over time.

use super::button::Button;
use super::chord::{ButtonSet, ChordDetector};
use super::snapshot::Snapshot;
use crate::BUTTON_COUNT;

/// Stateful store of raw inputs.
///
/// This struct turns the raw snapshot into a set of abstracted peripherals.
/// These peripherals provide features such as edge detection, long press
/// detection and chord tracking.
///
/// Note that despite all its attributes are public, they should be only read
/// from.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Store {
    pub buttons: [Button; BUTTON_COUNT],
    pub chord: ChordDetector,
}

impl Store {
    pub fn update(&mut self, snapshot: Snapshot) {
        for (i, button) in self.buttons.iter_mut().enumerate() {
            button.update(snapshot.buttons[i], snapshot.timestamp);
        }
        self.chord
            .update(ButtonSet::from_pressed(&snapshot.buttons));
    }

    /// Index of the only pressed button, if exactly one is pressed.
    ///
    /// Single-button gestures are dispatched only through this accessor,
    /// multi-button activity belongs to the chord detector.
    #[must_use]
    pub fn single_held(&self) -> Option<usize> {
        let mut found = None;
        for (i, button) in self.buttons.iter().enumerate() {
            if button.pressed {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }
}
