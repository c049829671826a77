#![no_main]
#![no_std]

use stomp_firmware as _; // global logger + panicking-behavior

#[rtic::app(device = stm32h7xx_hal::pac, peripherals = true, dispatchers = [EXTI0, EXTI1])]
mod app {
    use daisy::led::{Led, LedUser};
    use fugit::ExtU64;
    use systick_monotonic::Systick;

    use stomp_control::{DesiredOutput, Snapshot, Store};
    use stomp_firmware::system::display::Lcd;
    use stomp_firmware::system::inputs::Buttons;
    use stomp_firmware::system::midi::MidiOut;
    use stomp_firmware::system::storage::Storage;
    use stomp_firmware::system::System;

    #[monotonic(binds = SysTick, default = true)]
    type Mono = Systick<1000>; // 1 kHz / 1 ms granularity

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        status_led: LedUser,
        buttons: Buttons,
        midi: MidiOut,
        lcd: Lcd,
        storage: Storage,
        store: Store,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("INIT");

        let system = System::init(cx.core, cx.device);
        let mono = system.mono;
        let mut storage = system.storage;

        let grid = storage.load_or_init();
        let store = Store::new(grid);

        control::spawn().unwrap();
        blink::spawn(true).unwrap();

        (
            Shared {},
            Local {
                status_led: system.status_led,
                buttons: system.buttons,
                midi: system.midi,
                lcd: system.lcd,
                storage,
                store,
            },
            init::Monotonics(mono),
        )
    }

    /// The single cooperative control loop: sample, interpret, react.
    #[task(local = [buttons, midi, lcd, storage, store, shown: Option<DesiredOutput> = None])]
    fn control(cx: control::Context) {
        control::spawn_after(1.millis()).unwrap();

        let timestamp = monotonics::now().ticks() as u32;
        let buttons = cx.local.buttons.sample();

        let result = cx
            .local
            .store
            .apply_input_snapshot(Snapshot { timestamp, buttons });
        if let Some(message) = result.midi {
            cx.local.midi.send(message);
        }
        if let Some(write) = result.save {
            cx.local.storage.commit(write);
        }

        // The display is slow, touch it only when the content changes.
        let output = cx.local.store.tick(timestamp);
        if cx.local.shown.as_ref() != Some(&output) {
            cx.local.lcd.show(&output);
            *cx.local.shown = Some(output);
        }
    }

    #[task(local = [status_led])]
    fn blink(cx: blink::Context, on: bool) {
        if on {
            cx.local.status_led.on();
        } else {
            cx.local.status_led.off();
        }
        blink::spawn_after(1.secs(), !on).unwrap();
    }
}
