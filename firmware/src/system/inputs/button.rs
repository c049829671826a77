use super::debounce::Majority;
use crate::system::hal::gpio;

/// One foot switch, active-low with a pull-up.
pub struct Button {
    pin: Pin,
    debounce: Majority<4>,
    pub active: bool,
}

pub type Pin = gpio::ErasedPin<gpio::Input>;

impl Button {
    pub fn new(pin: Pin) -> Self {
        Self {
            pin,
            debounce: Majority::new(),
            active: false,
        }
    }

    pub fn sample(&mut self) {
        self.active = self.debounce.update(self.pin.is_low());
    }

    pub fn active_no_filter(&self) -> bool {
        self.pin.is_low()
    }
}
