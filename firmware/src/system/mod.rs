pub mod display;
pub mod inputs;
pub mod midi;
pub mod storage;

pub use daisy::hal;

use daisy::led::LedUser;
use hal::pac::CorePeripherals;
use hal::pac::Peripherals as DevicePeripherals;
use hal::prelude::*;
use systick_monotonic::Systick;

use stomp_control::MIDI_BAUD;

use display::{Lcd, Pins as LcdPins};
use inputs::{Buttons, Pins as ButtonsPins};
use midi::MidiOut;
use storage::Storage;

pub struct System {
    pub mono: Systick<1000>,
    pub status_led: LedUser,
    pub buttons: Buttons,
    pub midi: MidiOut,
    pub lcd: Lcd,
    pub storage: Storage,
}

impl System {
    /// Initialize system abstraction
    ///
    /// # Panics
    ///
    /// The system can be initialized only once. It panics otherwise.
    #[must_use]
    pub fn init(mut cp: CorePeripherals, dp: DevicePeripherals) -> Self {
        enable_cache(&mut cp);

        let board = daisy::Board::take().unwrap();
        let ccdr = daisy::board_freeze_clocks!(board, dp);
        let pins = daisy::board_split_gpios!(board, ccdr, dp);

        let mono = Systick::new(cp.SYST, 480_000_000);
        let status_led = daisy::board_split_leds!(pins).USER;
        let flash = daisy::board_split_flash!(ccdr, dp, pins);

        let buttons = Buttons::new(ButtonsPins {
            button_1: pins.GPIO.PIN_9.into_pull_up_input().erase(),
            button_2: pins.GPIO.PIN_10.into_pull_up_input().erase(),
            button_3: pins.GPIO.PIN_11.into_pull_up_input().erase(),
            button_4: pins.GPIO.PIN_12.into_pull_up_input().erase(),
        });

        let midi = {
            let serial = dp
                .USART1
                .serial(
                    (
                        pins.GPIO.PIN_13.into_alternate(),
                        pins.GPIO.PIN_14.into_alternate(),
                    ),
                    MIDI_BAUD.bps(),
                    ccdr.peripheral.USART1,
                    &ccdr.clocks,
                )
                .unwrap();
            let (tx, _rx) = serial.split();
            MidiOut::new(tx)
        };

        let lcd = Lcd::new(LcdPins {
            register_select: pins.GPIO.PIN_1.into_push_pull_output().erase(),
            enable: pins.GPIO.PIN_2.into_push_pull_output().erase(),
            data_4: pins.GPIO.PIN_3.into_push_pull_output().erase(),
            data_5: pins.GPIO.PIN_4.into_push_pull_output().erase(),
            data_6: pins.GPIO.PIN_5.into_push_pull_output().erase(),
            data_7: pins.GPIO.PIN_6.into_push_pull_output().erase(),
        });

        Self {
            mono,
            status_led,
            buttons,
            midi,
            lcd,
            storage: Storage::new(flash),
        }
    }
}

/// AN5212: Improve application performance when fetching instruction and
/// data, from both internal and external memories.
fn enable_cache(cp: &mut CorePeripherals) {
    cp.SCB.enable_icache();
    cp.SCB.enable_dcache(&mut cp.CPUID);
}
