//! Manage button's state.

use crate::LONG_PRESS_MS;

/// Use this to hold one button's state over time.
///
/// Detects press and release edges between polls, and a single long press
/// per press episode. All interval arithmetic wraps, so the millisecond
/// clock may roll over while a button is held.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Button {
    pub pressed: bool,
    pub clicked: bool,
    pub released: bool,
    pressed_at: u32,
    long_press_fired: bool,
}

impl Button {
    pub fn update(&mut self, down: bool, now: u32) {
        let was_pressed = self.pressed;
        self.pressed = down;
        self.clicked = self.pressed && !was_pressed;
        self.released = !self.pressed && was_pressed;
        if self.clicked {
            self.pressed_at = now;
            self.long_press_fired = false;
        }
    }

    /// Report a long press, at most once per press episode.
    pub fn long_pressed(&mut self, now: u32) -> bool {
        if self.pressed
            && !self.long_press_fired
            && now.wrapping_sub(self.pressed_at) > LONG_PRESS_MS
        {
            self.long_press_fired = true;
            true
        } else {
            false
        }
    }
}
