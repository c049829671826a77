//! Two-line character display in 4-bit parallel mode.

use stomp_control::{DesiredOutput, LINE_WIDTH};

use crate::system::hal::gpio;

pub type Pin = gpio::ErasedPin<gpio::Output>;

/// DDRAM address of each line on a 16x2 module.
const LINE_ADDRESS: [u8; 2] = [0x00, 0x40];

const CYCLES_PER_US: u32 = 480;

pub struct Lcd {
    register_select: Pin,
    enable: Pin,
    data: [Pin; 4],
}

pub struct Pins {
    pub register_select: Pin,
    pub enable: Pin,
    pub data_4: Pin,
    pub data_5: Pin,
    pub data_6: Pin,
    pub data_7: Pin,
}

impl Lcd {
    pub fn new(pins: Pins) -> Self {
        let mut lcd = Self {
            register_select: pins.register_select,
            enable: pins.enable,
            data: [pins.data_4, pins.data_5, pins.data_6, pins.data_7],
        };
        lcd.initialize();
        lcd
    }

    /// Push both lines, padding them with spaces to the full width.
    pub fn show(&mut self, output: &DesiredOutput) {
        for (i, line) in output.lines.iter().enumerate() {
            self.command(0x80 | LINE_ADDRESS[i]);
            for byte in line.as_bytes() {
                self.data(*byte);
            }
            for _ in line.len()..LINE_WIDTH {
                self.data(b' ');
            }
        }
    }

    // Init by instruction, see the HD44780 datasheet figure 24.
    fn initialize(&mut self) {
        delay_us(15_000);
        self.write_nibble(0x3);
        delay_us(4_100);
        self.write_nibble(0x3);
        delay_us(100);
        self.write_nibble(0x3);
        delay_us(100);
        self.write_nibble(0x2);
        delay_us(100);

        self.command(0x28); // 4-bit bus, two lines, 5x8 font.
        self.command(0x08); // Display off.
        self.command(0x01); // Clear.
        delay_us(2_000);
        self.command(0x06); // Entry mode: increment, no shift.
        self.command(0x0C); // Display on, no cursor.
    }

    fn command(&mut self, byte: u8) {
        self.register_select.set_low();
        self.write_byte(byte);
    }

    fn data(&mut self, byte: u8) {
        self.register_select.set_high();
        self.write_byte(byte);
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_nibble(byte >> 4);
        self.write_nibble(byte & 0xF);
        delay_us(50);
    }

    fn write_nibble(&mut self, nibble: u8) {
        for (i, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << i) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        self.enable.set_high();
        delay_us(1);
        self.enable.set_low();
        delay_us(1);
    }
}

fn delay_us(us: u32) {
    cortex_m::asm::delay(us * CYCLES_PER_US);
}
