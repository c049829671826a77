//! Abstraction of the foot switch row.

mod button;
mod debounce;

use button::{Button, Pin};
use stomp_control::BUTTON_COUNT;

pub struct Buttons {
    buttons: [Button; BUTTON_COUNT],
}

pub struct Pins {
    pub button_1: Pin,
    pub button_2: Pin,
    pub button_3: Pin,
    pub button_4: Pin,
}

impl Buttons {
    pub fn new(pins: Pins) -> Self {
        Self {
            buttons: [
                Button::new(pins.button_1),
                Button::new(pins.button_2),
                Button::new(pins.button_3),
                Button::new(pins.button_4),
            ],
        }
    }

    /// Sample all switches through their debounce filters.
    pub fn sample(&mut self) -> [bool; BUTTON_COUNT] {
        let mut state = [false; BUTTON_COUNT];
        for (i, button) in self.buttons.iter_mut().enumerate() {
            button.sample();
            state[i] = button.active;
        }
        state
    }
}
