use crate::system::inputs::Buttons;

pub fn sample_until_any_button_is_pressed(buttons: &mut Buttons) {
    loop {
        let state = buttons.sample();
        if state.iter().any(|pressed| *pressed) {
            break;
        }
        cortex_m::asm::delay(480_000_000 / 1000);
    }
}
