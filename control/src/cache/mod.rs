//! Cache of the interpreted controller state.

pub mod display;

use self::display::Display;
use crate::save::PresetGrid;

/// Cache keeping internal attributes.
///
/// This information is sufficient to serve preset lookups and to hold state
/// for the display.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cache {
    pub grid: PresetGrid,
    pub page: usize,
    /// The last emitted program value, blank until the first emission.
    pub preset: Option<u8>,
    pub display: Display,
}

impl Cache {
    #[must_use]
    pub fn new(grid: PresetGrid) -> Self {
        Self {
            grid,
            page: 0,
            preset: None,
            display: Display::default(),
        }
    }
}
