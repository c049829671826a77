//! State machine representing the two-line character display.

use core::fmt::Write as _;

use heapless::String;

use crate::{LINE_WIDTH, STATUS_DWELL_MS};

/// One rendered display line. Padding to the full width is left to the
/// display wrapper.
pub type Line = String<LINE_WIDTH>;

/// Prioritized screens of the display.
///
/// The highest set priority wins: a transient status overrides the edit
/// banner, which overrides the page/preset summary. The summary is always
/// present.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Display {
    prioritized: [Option<Screen>; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Commit/cancel outcome, shown since the carried timestamp.
    Status(Status, u32),
    /// Edit banner with the value under live edit.
    Edit {
        page: usize,
        button: usize,
        pending: u8,
    },
    /// Current page and the last emitted preset.
    Summary { page: usize, preset: Option<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    NoChange,
    Cancel,
}

impl Status {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NoChange => "NO CHANGE",
            Self::Cancel => "CANCEL",
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self {
            prioritized: [
                None,
                None,
                Some(Screen::Summary {
                    page: 0,
                    preset: None,
                }),
            ],
        }
    }
}

impl Display {
    /// Drop the status override once its dwell has passed.
    pub fn expire_status(&mut self, now: u32) {
        if let Some(Screen::Status(_, shown_at)) = self.prioritized[0] {
            if now.wrapping_sub(shown_at) >= STATUS_DWELL_MS {
                self.prioritized[0] = None;
            }
        }
    }

    #[must_use]
    pub fn status_shown(&self) -> bool {
        self.prioritized[0].is_some()
    }

    pub fn set_status(&mut self, status: Status, now: u32) {
        self.prioritized[0] = Some(Screen::Status(status, now));
    }

    pub fn set_edit(&mut self, page: usize, button: usize, pending: u8) {
        self.prioritized[1] = Some(Screen::Edit {
            page,
            button,
            pending,
        });
    }

    pub fn reset_edit(&mut self) {
        self.prioritized[1] = None;
    }

    pub fn set_summary(&mut self, page: usize, preset: Option<u8>) {
        self.prioritized[2] = Some(Screen::Summary { page, preset });
    }

    #[must_use]
    pub fn active_screen(&self) -> &Screen {
        self.prioritized
            .iter()
            .find_map(Option::as_ref)
            .expect("There always is at least one active screen.")
    }
}

impl Screen {
    /// Render the screen into the two display lines.
    ///
    /// Pages, buttons and presets are numbered from 1 for the operator.
    #[must_use]
    pub fn lines(&self) -> [Line; 2] {
        let mut line_1 = Line::new();
        let mut line_2 = Line::new();

        match self {
            Self::Status(status, _) => {
                let _ = line_1.push_str(status.label());
            }
            Self::Edit {
                page,
                button,
                pending,
            } => {
                let _ = write!(line_1, "Editing {}-{}", page + 1, button + 1);
                let _ = write!(line_2, "Preset {}", u16::from(*pending) + 1);
            }
            Self::Summary { page, preset } => {
                let _ = write!(line_1, "Page {}", page + 1);
                if let Some(preset) = preset {
                    let _ = write!(line_2, "Preset {}", u16::from(*preset) + 1);
                }
            }
        }

        [line_1, line_2]
    }
}
