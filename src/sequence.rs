// Batch sequence — fixed-size training batches over a pair set
//
// The sequence partitions the pair set into contiguous, order-preserving
// batches and materializes the input tensor(s) and targets for one batch
// on demand. It is driven by an epoch-based training loop that requests
// batch 0 first in every pass, which is the point where per-epoch
// rotation schedules are redrawn.

use std::path::PathBuf;

use ndarray::{s, Array1, Array2, Array4, Axis};

use crate::channels::{ChannelAssembler, ChannelLayout};
use crate::error::{DataError, Result};
use crate::pairs::PairSet;
use crate::rotation::{RotationMode, RotationSchedule};

/// Configuration for a [`ScanPairSequence`].
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// Number of pairs per batch (the final batch may be smaller).
    pub batch_size: usize,
    /// Input image height.
    pub height: usize,
    /// Input image width.
    pub width: usize,
    /// Channel depth of the input tensor. Channels not covered by an
    /// enabled modality stay zero.
    pub no_channels: usize,
    /// Width M of the network's peak output vector.
    pub network_output_size: usize,
    /// Which modality layers fill the input channels.
    pub layout: ChannelLayout,
    /// Shift augmentation applied to the second leg.
    pub rotate: RotationMode,
    /// Seed for the owned shift RNG.
    pub seed: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            height: 64,
            width: 900,
            no_channels: 4,
            network_output_size: 360,
            layout: ChannelLayout::default(),
            rotate: RotationMode::None,
            seed: 1234,
        }
    }
}

impl SequenceConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn image_size(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    pub fn no_channels(mut self, c: usize) -> Self {
        self.no_channels = c;
        self
    }

    pub fn network_output_size(mut self, m: usize) -> Self {
        self.network_output_size = m;
        self
    }

    pub fn layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn rotate(mut self, mode: RotationMode) -> Self {
        self.rotate = mode;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Targets for one batch.
#[derive(Debug, Clone)]
pub enum Targets {
    /// Single-leg mode: only the peak matrix `(size, network_output_size)`.
    SingleLeg(Array2<f32>),
    /// Paired mode, matching the dual-head network: `scores` is the overlap
    /// batch followed by the function-angle batch (length `2 * size`), and
    /// `peaks` is the per-pair peak matrix.
    PairedLegs {
        scores: Array1<f32>,
        peaks: Array2<f32>,
    },
}

/// One materialized batch: inputs per leg plus the matching targets.
#[derive(Debug, Clone)]
pub struct Batch {
    /// One `(size, height, width, no_channels)` tensor per leg.
    pub inputs: Vec<Array4<f32>>,
    pub targets: Targets,
}

impl Batch {
    /// Number of pairs in this batch.
    pub fn size(&self) -> usize {
        self.inputs[0].len_of(Axis(0))
    }
}

/// A finite, indexable, repeatable sequence of training batches.
///
/// Batches partition `[0, n)` contiguously in the original pair order.
/// The rotation schedule is the only mutable state and changes only at
/// pass boundaries; everything else is read-only after construction.
#[derive(Debug)]
pub struct ScanPairSequence {
    pairs: PairSet,
    config: SequenceConfig,
    assembler: ChannelAssembler,
    schedule: Option<RotationSchedule>,
}

impl ScanPairSequence {
    /// Create a sequence over `pairs`, resolving sample files against
    /// `image_path`.
    pub fn new(
        image_path: impl Into<PathBuf>,
        pairs: PairSet,
        config: SequenceConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(DataError::Config("batch_size must be positive".into()));
        }
        if config.network_output_size == 0 {
            return Err(DataError::Config(
                "network_output_size must be positive".into(),
            ));
        }
        if config.height == 0 || config.width == 0 {
            return Err(DataError::Config("image size must be positive".into()));
        }
        let enabled = config.layout.channel_count();
        if enabled > config.no_channels {
            return Err(DataError::ChannelOverflow {
                enabled,
                no_channels: config.no_channels,
            });
        }

        let schedule =
            RotationSchedule::new(config.rotate, pairs.len(), config.width, config.seed);
        let assembler = ChannelAssembler::new(
            image_path,
            config.layout,
            config.height,
            config.width,
        );

        Ok(Self {
            pairs,
            config,
            assembler,
            schedule,
        })
    }

    /// Number of batches: `ceil(n / batch_size)`.
    pub fn num_batches(&self) -> usize {
        self.pairs.len().div_ceil(self.config.batch_size)
    }

    /// Total number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Materialize batch `idx`.
    ///
    /// Requesting batch 0 marks the start of a new pass; a
    /// [`RotationMode::PerEpoch`] schedule redraws its shifts at that point
    /// and nowhere else. Leg 1 is assembled without rotation; in paired
    /// mode, leg 2 of the pair at global index `g` is rolled by
    /// `schedule.shift(g)`.
    pub fn get_batch(&mut self, idx: usize) -> Result<Batch> {
        let num_batches = self.num_batches();
        if idx >= num_batches {
            return Err(DataError::BatchOutOfRange {
                index: idx,
                num_batches,
            });
        }
        if idx == 0 {
            if let Some(schedule) = self.schedule.as_mut() {
                schedule.begin_pass();
            }
        }

        let bs = self.config.batch_size;
        let n = self.pairs.len();
        let start = idx * bs;
        let end = ((idx + 1) * bs).min(n);
        let size = end - start;
        let (h, w, c) = (self.config.height, self.config.width, self.config.no_channels);

        let mut x1 = Array4::<f32>::zeros((size, h, w, c));
        let mut x2 = if self.pairs.is_paired() {
            Some(Array4::<f32>::zeros((size, h, w, c)))
        } else {
            None
        };

        for (slot, global) in (start..end).enumerate() {
            self.assembler.fill_sample(
                x1.index_axis_mut(Axis(0), slot),
                self.pairs.filename1(global),
                self.pairs.dir1(global),
                None,
            )?;

            if let (Some(x2), Some((name2, dir2))) = (x2.as_mut(), self.pairs.leg2(global)) {
                // The schedule is indexed by batch start + slot, also for a
                // short final batch.
                let shift = self.schedule.as_ref().map(|s| s.shift(global));
                self.assembler
                    .fill_sample(x2.index_axis_mut(Axis(0), slot), name2, dir2, shift)?;
            }
        }

        let overlap = self.pairs.overlap().slice(s![start..end]);
        let function_angle = self.pairs.function_angle().slice(s![start..end]);
        let orientation = self.pairs.orientation().slice(s![start..end]);

        let m = self.config.network_output_size;
        let mut peaks = Array2::<f32>::zeros((size, m));
        for (row, (&bin, &angle)) in orientation.iter().zip(function_angle.iter()).enumerate() {
            if !(bin >= 0.0 && bin < m as f32) {
                return Err(DataError::OrientationOutOfRange {
                    index: bin,
                    size: m,
                    row: start + row,
                });
            }
            peaks[[row, bin as usize]] = angle;
        }

        let (inputs, targets) = match x2 {
            Some(x2) => {
                let mut scores = Array1::<f32>::zeros(2 * size);
                scores.slice_mut(s![..size]).assign(&overlap);
                scores.slice_mut(s![size..]).assign(&function_angle);
                (vec![x1, x2], Targets::PairedLegs { scores, peaks })
            }
            None => (vec![x1], Targets::SingleLeg(peaks)),
        };

        Ok(Batch { inputs, targets })
    }
}
