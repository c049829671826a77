//! The Normal/Edit state machine turning input events into reactions.

use heapless::Vec;

use crate::cache::display::Status;
use crate::cache::Cache;
use crate::input::chord::ButtonSet;
use crate::input::snapshot::Snapshot;
use crate::input::store::Store as Input;
use crate::log;
use crate::midi::ProgramChange;
use crate::output::DesiredOutput;
use crate::save::{PresetGrid, SlotWrite};
use crate::PAGE_COUNT;

/// Chord moving one page back, or cancelling an edit.
const PAGE_PREVIOUS: ButtonSet = ButtonSet::pair(0, 1);
/// Chord moving one page forward, or committing an edit.
const PAGE_NEXT: ButtonSet = ButtonSet::pair(2, 3);

/// The main store of peripheral abstraction and controller state.
///
/// This struct is the central piece of the control package. It takes
/// [`Snapshot`] on its inputs, passes it to peripheral abstractions,
/// interprets the current input into button and chord events and manages
/// the whole state machine of that.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Store {
    pub(crate) input: Input,
    pub(crate) state: State,
    pub(crate) cache: Cache,
}

/// The current state of the control state machine.
///
/// The edit context lives inside the state, there is no edit data outside
/// the `Editing` variant.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum State {
    Normal,
    Editing(StateEditing),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct StateEditing {
    page: usize,
    button: usize,
    pending: u8,
}

/// Discrete input events interpreted from one poll.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Event {
    Press(usize),
    Release(usize),
    LongPress(usize),
    ChordRelease(ButtonSet),
}

/// Response of the control store after processing a new input snapshot.
///
/// This response should be evaluated by the caller and passed further to
/// the MIDI transport and the storage driver.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplyInputSnapshotResult {
    pub midi: Option<ProgramChange>,
    pub save: Option<SlotWrite>,
}

impl Store {
    #[must_use]
    pub fn new(grid: PresetGrid) -> Self {
        Self {
            input: Input::default(),
            state: State::Normal,
            cache: Cache::new(grid),
        }
    }

    pub fn apply_input_snapshot(&mut self, snapshot: Snapshot) -> ApplyInputSnapshotResult {
        let now = snapshot.timestamp;
        self.cache.display.expire_status(now);
        self.input.update(snapshot);

        // While the commit/cancel status dwells on the display, button
        // activity is dropped, matching the blocking delay of the original
        // pedal. The raw edges are still tracked above so the input store
        // stays coherent once the dwell passes.
        if self.cache.display.status_shown() {
            self.input.chord.reset();
            return ApplyInputSnapshotResult::default();
        }

        let mut result = ApplyInputSnapshotResult::default();
        for event in self.collect_events(now) {
            self.converge(event, now, &mut result);
        }
        result
    }

    pub fn tick(&mut self, now: u32) -> DesiredOutput {
        self.cache.display.expire_status(now);
        DesiredOutput {
            lines: self.cache.display.active_screen().lines(),
        }
    }

    fn collect_events(&mut self, now: u32) -> Vec<Event, 8> {
        let mut events = Vec::new();

        if let Some(chord) = self.input.chord.resolved {
            let _ = events.push(Event::ChordRelease(chord));
        }

        // Gestures that went multi-button belong to the chord detector
        // alone, they must not leak single-button presses.
        if self.input.chord.peak() <= 1 {
            if let Some(button) = self.input.single_held() {
                if self.input.buttons[button].clicked {
                    let _ = events.push(Event::Press(button));
                } else if self.input.buttons[button].long_pressed(now) {
                    let _ = events.push(Event::LongPress(button));
                }
            }
        }

        for (i, button) in self.input.buttons.iter().enumerate() {
            if button.released {
                let _ = events.push(Event::Release(i));
            }
        }

        events
    }

    fn converge(&mut self, event: Event, now: u32, result: &mut ApplyInputSnapshotResult) {
        match self.state {
            State::Normal => self.converge_from_normal_state(event, result),
            State::Editing(editing) => {
                self.converge_from_editing_state(editing, event, now, result);
            }
        }
    }

    fn converge_from_normal_state(&mut self, event: Event, result: &mut ApplyInputSnapshotResult) {
        match event {
            Event::Press(button) => {
                let program = self.cache.grid.preset(self.cache.page, button);
                self.emit_program(program, result);
            }
            Event::LongPress(button) => {
                let pending = self.cache.grid.preset(self.cache.page, button);
                self.state = State::Editing(StateEditing {
                    page: self.cache.page,
                    button,
                    pending,
                });
                self.cache.display.set_edit(self.cache.page, button, pending);
                log::info!(
                    "Editing page={=usize} button={=usize} from={=u8}",
                    self.cache.page,
                    button,
                    pending
                );
            }
            Event::ChordRelease(chord) if chord == PAGE_PREVIOUS => {
                self.cache.page = self.cache.page.saturating_sub(1);
                let program = self.cache.grid.preset(self.cache.page, 0);
                self.emit_program(program, result);
            }
            Event::ChordRelease(chord) if chord == PAGE_NEXT => {
                self.cache.page = (self.cache.page + 1).min(PAGE_COUNT - 1);
                let program = self.cache.grid.preset(self.cache.page, 0);
                self.emit_program(program, result);
            }
            Event::ChordRelease(_) | Event::Release(_) => (),
        }
    }

    fn converge_from_editing_state(
        &mut self,
        mut editing: StateEditing,
        event: Event,
        now: u32,
        result: &mut ApplyInputSnapshotResult,
    ) {
        match event {
            Event::Press(button) => {
                editing.pending = adjusted_pending(editing.pending, button);
                self.state = State::Editing(editing);
                self.cache
                    .display
                    .set_edit(editing.page, editing.button, editing.pending);
                // Preview lets the operator hear the candidate right away.
                result.midi = Some(ProgramChange::new(editing.pending));
            }
            Event::ChordRelease(chord) if chord == PAGE_PREVIOUS => {
                let program = self.cache.grid.preset(editing.page, editing.button);
                self.state = State::Normal;
                self.cache.display.reset_edit();
                self.cache.display.set_status(Status::Cancel, now);
                self.emit_program(program, result);
                log::info!("Cancelled edit, reverting to {=u8}", program);
            }
            Event::ChordRelease(chord) if chord == PAGE_NEXT => {
                let previous = self.cache.grid.preset(editing.page, editing.button);
                if previous == editing.pending {
                    self.cache.display.set_status(Status::NoChange, now);
                } else {
                    self.cache
                        .grid
                        .set_preset(editing.page, editing.button, editing.pending);
                    result.save = Some(SlotWrite {
                        address: PresetGrid::address(editing.page, editing.button),
                        value: editing.pending,
                    });
                    self.cache.display.set_status(Status::Ok, now);
                    log::info!(
                        "Committed page={=usize} button={=usize} value={=u8}",
                        editing.page,
                        editing.button,
                        editing.pending
                    );
                }
                self.state = State::Normal;
                self.cache.display.reset_edit();
                self.emit_program(editing.pending, result);
            }
            Event::LongPress(_) | Event::ChordRelease(_) | Event::Release(_) => (),
        }
    }

    fn emit_program(&mut self, program: u8, result: &mut ApplyInputSnapshotResult) {
        result.midi = Some(ProgramChange::new(program));
        self.cache.preset = Some(program);
        self.cache
            .display
            .set_summary(self.cache.page, self.cache.preset);
    }
}

/// Per-button delta applied to the value under edit. Steps that would leave
/// the 0..=127 range are dropped, the value does not saturate.
fn adjusted_pending(pending: u8, button: usize) -> u8 {
    let adjusted = match button {
        0 => pending.checked_sub(10),
        1 => pending.checked_sub(1),
        2 => pending.checked_add(1),
        3 => pending.checked_add(10),
        _ => None,
    };
    adjusted.filter(|value| *value <= 127).unwrap_or(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{IMAGE_SIZE, SIGNATURE};
    use crate::{BUTTON_COUNT, LONG_PRESS_MS, STATUS_DWELL_MS};

    fn apply(
        store: &mut Store,
        now: &mut u32,
        buttons: [bool; BUTTON_COUNT],
    ) -> ApplyInputSnapshotResult {
        *now = now.wrapping_add(1);
        store.apply_input_snapshot(Snapshot {
            timestamp: *now,
            buttons,
        })
    }

    fn buttons(held: &[usize]) -> [bool; BUTTON_COUNT] {
        let mut buttons = [false; BUTTON_COUNT];
        for button in held {
            buttons[*button] = true;
        }
        buttons
    }

    fn tap_button(store: &mut Store, now: &mut u32, button: usize) -> ApplyInputSnapshotResult {
        let down = apply(store, now, buttons(&[button]));
        let up = apply(store, now, buttons(&[]));
        ApplyInputSnapshotResult {
            midi: down.midi.or(up.midi),
            save: down.save.or(up.save),
        }
    }

    fn hold_button(store: &mut Store, now: &mut u32, button: usize) {
        for _ in 0..LONG_PRESS_MS + 2 {
            apply(store, now, buttons(&[button]));
        }
        apply(store, now, buttons(&[]));
    }

    fn tap_chord(store: &mut Store, now: &mut u32, chord: &[usize]) -> ApplyInputSnapshotResult {
        let down = apply(store, now, buttons(chord));
        let up = apply(store, now, buttons(&[]));
        ApplyInputSnapshotResult {
            midi: down.midi.or(up.midi),
            save: down.save.or(up.save),
        }
    }

    fn wait(store: &mut Store, now: &mut u32, ms: u32) {
        for _ in 0..ms {
            apply(store, now, buttons(&[]));
        }
    }

    fn line(store: &mut Store, now: u32, index: usize) -> String {
        store.tick(now).lines[index].as_str().to_owned()
    }

    #[test]
    fn it_should_be_possible_to_initialize_store() {
        let _store = Store::new(PresetGrid::default());
    }

    #[test]
    fn when_single_button_is_pressed_it_emits_the_preset_of_the_active_page() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let result = tap_button(&mut store, &mut now, 1);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 1]);
        assert!(result.save.is_none());

        assert_eq!(line(&mut store, now, 0), "Page 1");
        assert_eq!(line(&mut store, now, 1), "Preset 2");
    }

    #[test]
    fn when_single_button_is_tapped_exactly_one_message_is_emitted() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let mut emissions = 0;
        for result in [
            apply(&mut store, &mut now, buttons(&[2])),
            apply(&mut store, &mut now, buttons(&[2])),
            apply(&mut store, &mut now, buttons(&[])),
            apply(&mut store, &mut now, buttons(&[])),
        ] {
            emissions += usize::from(result.midi.is_some());
        }
        assert_eq!(emissions, 1);
    }

    #[test]
    fn when_page_up_chord_releases_page_increments_and_emits_its_first_slot() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let result = tap_chord(&mut store, &mut now, &[2, 3]);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 4]);
        assert_eq!(line(&mut store, now, 0), "Page 2");
        assert_eq!(line(&mut store, now, 1), "Preset 5");
    }

    #[test]
    fn when_page_down_chord_releases_page_decrements_and_emits_its_first_slot() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        tap_chord(&mut store, &mut now, &[2, 3]);
        let result = tap_chord(&mut store, &mut now, &[0, 1]);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 0]);
        assert_eq!(line(&mut store, now, 0), "Page 1");
    }

    #[test]
    fn when_page_navigation_hits_the_edges_it_saturates_but_still_emits() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let result = tap_chord(&mut store, &mut now, &[0, 1]);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 0]);
        assert_eq!(line(&mut store, now, 0), "Page 1");

        for _ in 0..PAGE_COUNT + 2 {
            tap_chord(&mut store, &mut now, &[2, 3]);
        }
        let result = tap_chord(&mut store, &mut now, &[2, 3]);
        let last_page_slot_0 = PresetGrid::default().preset(PAGE_COUNT - 1, 0);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, last_page_slot_0]);
        assert_eq!(line(&mut store, now, 0), "Page 8");
    }

    #[test]
    fn when_staggered_releases_happen_the_peak_set_is_evaluated() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        // Buttons {0, 1, 2} were held at the peak. The trailing pair {0, 1}
        // must not be mistaken for the page-down chord.
        apply(&mut store, &mut now, buttons(&[0, 1, 2]));
        apply(&mut store, &mut now, buttons(&[0, 1]));
        let result = apply(&mut store, &mut now, buttons(&[]));
        assert!(result.midi.is_none());
        assert_eq!(line(&mut store, now, 0), "Page 1");
    }

    #[test]
    fn when_second_button_joins_a_hold_no_single_press_dispatch_happens() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        apply(&mut store, &mut now, buttons(&[0]));
        for _ in 0..2 * LONG_PRESS_MS {
            apply(&mut store, &mut now, buttons(&[0, 1]));
        }
        let result = apply(&mut store, &mut now, buttons(&[]));

        // The long hold did not enter edit, the gesture resolved as the
        // page-down chord instead.
        assert!(store.state == State::Normal);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 0]);
    }

    #[test]
    fn when_button_is_long_pressed_it_enters_edit_with_the_stored_value() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        for _ in 0..LONG_PRESS_MS + 2 {
            apply(&mut store, &mut now, buttons(&[2]));
        }

        assert!(
            store.state
                == State::Editing(StateEditing {
                    page: 0,
                    button: 2,
                    pending: 2,
                })
        );
        assert_eq!(line(&mut store, now, 0), "Editing 1-3");
        assert_eq!(line(&mut store, now, 1), "Preset 3");
    }

    #[test]
    fn when_long_press_continues_it_fires_only_once() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let mut emissions = 0;
        for _ in 0..4 * LONG_PRESS_MS {
            let result = apply(&mut store, &mut now, buttons(&[0]));
            emissions += usize::from(result.midi.is_some());
        }
        // One emission from the press edge, none from the ongoing hold.
        assert_eq!(emissions, 1);
    }

    #[test]
    fn when_editing_presses_adjust_the_pending_value_and_preview_it() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 2);

        let result = tap_button(&mut store, &mut now, 2);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 3]);
        assert_eq!(line(&mut store, now, 1), "Preset 4");

        let result = tap_button(&mut store, &mut now, 3);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 13]);

        let result = tap_button(&mut store, &mut now, 1);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 12]);

        let result = tap_button(&mut store, &mut now, 0);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 2]);
    }

    #[test]
    fn when_adjustment_would_leave_the_range_it_still_previews_unchanged() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        // Slot (0, 0) holds 0, stepping down is a no-op.
        hold_button(&mut store, &mut now, 0);
        let result = tap_button(&mut store, &mut now, 0);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 0]);
        let result = tap_button(&mut store, &mut now, 1);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 0]);
    }

    #[test]
    fn when_adjusting_up_the_value_stops_below_the_midi_limit() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 3);
        let mut last = 0;
        for _ in 0..20 {
            let result = tap_button(&mut store, &mut now, 3);
            last = result.midi.unwrap().program;
        }
        assert_eq!(last, 123);
        for _ in 0..10 {
            let result = tap_button(&mut store, &mut now, 2);
            last = result.midi.unwrap().program;
        }
        assert_eq!(last, 127);
    }

    #[test]
    fn when_commit_chord_releases_the_new_value_is_persisted() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 2);
        tap_button(&mut store, &mut now, 2);
        let result = tap_chord(&mut store, &mut now, &[2, 3]);

        assert!(store.state == State::Normal);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 3]);
        assert_eq!(
            result.save,
            Some(SlotWrite {
                address: PresetGrid::address(0, 2),
                value: 3,
            })
        );
        assert_eq!(store.cache.grid.preset(0, 2), 3);
        assert_eq!(line(&mut store, now, 0), "OK");
    }

    #[test]
    fn when_committing_an_unchanged_value_nothing_is_written() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 2);
        let result = tap_chord(&mut store, &mut now, &[2, 3]);

        assert!(result.save.is_none());
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 2]);
        assert_eq!(line(&mut store, now, 0), "NO CHANGE");
    }

    #[test]
    fn when_cancel_chord_releases_the_stored_preset_is_reverted() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 1);
        tap_button(&mut store, &mut now, 2);
        tap_button(&mut store, &mut now, 2);
        let result = tap_chord(&mut store, &mut now, &[0, 1]);

        assert!(store.state == State::Normal);
        assert!(result.save.is_none());
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 1]);
        assert_eq!(store.cache.grid.preset(0, 1), 1);
        assert_eq!(line(&mut store, now, 0), "CANCEL");
    }

    #[test]
    fn when_status_dwells_input_is_discarded_until_it_expires() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 2);
        tap_chord(&mut store, &mut now, &[2, 3]);
        assert_eq!(line(&mut store, now, 0), "NO CHANGE");

        let result = tap_button(&mut store, &mut now, 1);
        assert!(result.midi.is_none());

        wait(&mut store, &mut now, STATUS_DWELL_MS);
        assert_eq!(line(&mut store, now, 0), "Page 1");

        let result = tap_button(&mut store, &mut now, 1);
        assert_eq!(result.midi.unwrap().to_bytes(), [0xC0, 1]);
    }

    #[test]
    fn when_unmapped_chord_releases_nothing_happens_in_either_mode() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        let result = tap_chord(&mut store, &mut now, &[1, 2]);
        assert!(result.midi.is_none());
        assert!(store.state == State::Normal);

        hold_button(&mut store, &mut now, 0);
        let result = tap_chord(&mut store, &mut now, &[1, 2]);
        assert!(result.midi.is_none());
        assert!(matches!(store.state, State::Editing(_)));
    }

    #[test]
    fn when_the_clock_wraps_during_a_hold_edit_is_still_entered() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = u32::MAX - 100;

        for _ in 0..LONG_PRESS_MS + 200 {
            apply(&mut store, &mut now, buttons(&[3]));
        }
        assert!(matches!(store.state, State::Editing(_)));
    }

    #[test]
    fn edited_grid_round_trips_through_the_persistent_image() {
        let mut store = Store::new(PresetGrid::default());
        let mut now = 0;

        hold_button(&mut store, &mut now, 2);
        tap_button(&mut store, &mut now, 2);
        let result = tap_chord(&mut store, &mut now, &[2, 3]);

        // Mirror what the storage driver does with the slot write.
        let mut image = PresetGrid::default().to_bytes();
        let write = result.save.unwrap();
        image[write.address] = write.value;
        assert_eq!(image.len(), IMAGE_SIZE);
        assert_eq!(&image[IMAGE_SIZE - SIGNATURE.len()..], &SIGNATURE);

        let reloaded = PresetGrid::from_bytes(image).ok().unwrap();
        assert!(reloaded == store.cache.grid);
    }
}
