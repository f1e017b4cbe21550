// Rotation scheduling — per-pair circular shift amounts for augmentation
//
// The second image of a pair can be circularly shifted along the width axis
// to simulate a heading offset. Shift amounts are drawn per global sample
// index from an owned, explicitly seeded RNG, so two generator instances
// with the same seed produce the same schedule — there is no shared global
// RNG state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// When and how shift amounts are (re)drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// No shifting.
    None,
    /// One shift per pair, drawn once and stable across passes.
    FixedPerPair,
    /// Shifts are redrawn at the start of every pass over the dataset.
    PerEpoch,
}

impl Default for RotationMode {
    fn default() -> Self {
        RotationMode::None
    }
}

impl RotationMode {
    /// Interpret the numeric flag used in configuration files:
    /// 0 = none, 1 = fixed per pair, 2 = per epoch.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(RotationMode::None),
            1 => Some(RotationMode::FixedPerPair),
            2 => Some(RotationMode::PerEpoch),
            _ => None,
        }
    }
}

/// The shift assigned to every global sample index, each drawn uniformly
/// from `[0, width)`.
#[derive(Debug, Clone)]
pub struct RotationSchedule {
    mode: RotationMode,
    rng: StdRng,
    shifts: Vec<usize>,
    width: usize,
}

impl RotationSchedule {
    /// Build a schedule for `n` samples of the given image width.
    ///
    /// Returns `None` when `mode` disables rotation or `width` is zero
    /// (no meaningful shift exists).
    pub fn new(mode: RotationMode, n: usize, width: usize, seed: u64) -> Option<Self> {
        if mode == RotationMode::None || width == 0 {
            return None;
        }
        let mut schedule = Self {
            mode,
            rng: StdRng::seed_from_u64(seed),
            shifts: Vec::new(),
            width,
        };
        schedule.redraw(n);
        Some(schedule)
    }

    fn redraw(&mut self, n: usize) {
        self.shifts = (0..n).map(|_| self.rng.gen_range(0..self.width)).collect();
    }

    /// Mark the start of a new pass over the dataset.
    ///
    /// `PerEpoch` schedules draw a fresh shift for every sample — exactly
    /// once per pass, continuing the seeded RNG stream so consecutive
    /// passes differ. `FixedPerPair` schedules keep their shifts.
    pub fn begin_pass(&mut self) {
        if self.mode == RotationMode::PerEpoch {
            let n = self.shifts.len();
            self.redraw(n);
        }
    }

    /// The shift for the sample at `global_index`.
    ///
    /// # Panics
    /// Panics if `global_index` is past the end of the schedule.
    pub fn shift(&self, global_index: usize) -> usize {
        self.shifts[global_index]
    }

    /// All scheduled shifts, in sample order.
    pub fn shifts(&self) -> &[usize] {
        &self.shifts
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }
}
