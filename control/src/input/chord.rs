//! Detect multi-button chord gestures.

use crate::BUTTON_COUNT;

/// Set of button indices, stored as a bitmask.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn pair(a: usize, b: usize) -> Self {
        Self(1 << a | 1 << b)
    }

    #[must_use]
    pub fn from_pressed(pressed: &[bool; BUTTON_COUNT]) -> Self {
        let mut mask = 0;
        for (i, pressed) in pressed.iter().enumerate() {
            if *pressed {
                mask |= 1 << i;
            }
        }
        Self(mask)
    }

    #[must_use]
    pub fn contains(self, button: usize) -> bool {
        self.0 & (1 << button) != 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Use this to hold the chord gesture state over time.
///
/// A chord is the *peak* combination of concurrently held buttons within
/// one gesture. The held set is captured whenever the number of pressed
/// buttons exceeds the peak so far, and evaluated once all buttons are
/// released again. Releasing the buttons one by one therefore does not
/// shrink the reported combination.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordDetector {
    held: ButtonSet,
    peak: usize,
    /// The chord resolved by the gesture that ended this poll, if any.
    /// Valid for a single poll, like button edges.
    pub resolved: Option<ButtonSet>,
}

impl ChordDetector {
    pub fn update(&mut self, pressed: ButtonSet) {
        self.resolved = None;

        let total = pressed.len();
        if total > self.peak {
            self.peak = total;
            self.held = pressed;
        }

        if total == 0 && self.peak > 0 {
            if self.peak > 1 {
                self.resolved = Some(self.held);
            }
            self.held = ButtonSet::EMPTY;
            self.peak = 0;
        }
    }

    /// Peak number of concurrently held buttons of the ongoing gesture.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn reset(&mut self) {
        self.held = ButtonSet::EMPTY;
        self.peak = 0;
        self.resolved = None;
    }
}
