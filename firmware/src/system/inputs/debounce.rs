/// Majority vote over the last N raw samples of a digital input.
///
/// Mechanical foot switches bounce for a few milliseconds. Sampling at 1 kHz
/// through this filter settles an edge within N polls.
#[derive(Debug, Eq, PartialEq, defmt::Format)]
pub struct Majority<const N: usize> {
    samples: [bool; N],
    cursor: usize,
}

impl<const N: usize> Majority<N> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            samples: [false; N],
            cursor: 0,
        }
    }

    pub fn update(&mut self, value: bool) -> bool {
        self.samples[self.cursor] = value;
        self.cursor = (self.cursor + 1) % N;
        let up = self.samples.iter().filter(|sample| **sample).count();
        up > N / 2
    }
}
