//! Persistence of the preset grid in the on-board flash.

pub use daisy::flash::Flash;

use stomp_control::{BlankImage, PresetGrid, SlotWrite, IMAGE_SIZE};

/// Address of the preset image within the flash.
const IMAGE_ADDRESS: u32 = 0;

pub struct Storage {
    flash: Flash,
    image: [u8; IMAGE_SIZE],
}

impl Storage {
    #[must_use]
    pub fn new(flash: Flash) -> Self {
        Self {
            flash,
            image: [0; IMAGE_SIZE],
        }
    }

    /// Load the grid, stamping identity defaults on the first run.
    ///
    /// Once the signature is present the defaults never run again, even
    /// across reflashes that leave the storage untouched.
    pub fn load_or_init(&mut self) -> PresetGrid {
        self.flash.read(IMAGE_ADDRESS, &mut self.image);

        match PresetGrid::from_bytes(self.image) {
            Ok(grid) => {
                defmt::info!("Loaded preset grid from storage");
                grid
            }
            Err(BlankImage) => {
                defmt::info!("Blank storage, stamping identity defaults");
                let grid = PresetGrid::default();
                self.image = grid.to_bytes();
                self.flash.write(IMAGE_ADDRESS, &self.image);
                grid
            }
        }
    }

    /// Persist a single changed slot. The store already filtered out
    /// writes of unchanged values.
    pub fn commit(&mut self, write: SlotWrite) {
        defmt::info!(
            "Persisting slot address={=usize} value={=u8}",
            write.address,
            write.value
        );
        self.image[write.address] = write.value;
        self.flash.write(IMAGE_ADDRESS, &self.image);
    }
}
