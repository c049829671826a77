//! MIDI transmit over the serial port.

use stomp_control::ProgramChange;

use crate::system::hal::pac::USART1;
use crate::system::hal::prelude::*;
use crate::system::hal::serial::Tx;

pub struct MidiOut {
    tx: Tx<USART1>,
}

impl MidiOut {
    pub fn new(tx: Tx<USART1>) -> Self {
        Self { tx }
    }

    /// Blocking send. At 31250 baud a byte takes ~320 us on the wire.
    pub fn send(&mut self, message: ProgramChange) {
        for byte in message.to_bytes() {
            nb::block!(self.tx.write(byte)).ok();
        }
    }
}
