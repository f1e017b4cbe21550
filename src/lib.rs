//! # scanpair-data
//!
//! Batch-data supply for training overlap / function-angle / orientation
//! estimation networks on pairs of range-image-like scans.
//!
//! This crate provides:
//! - [`ScanPairSequence`] — a finite, indexable sequence of training batches
//! - [`ChannelAssembler`] — composes multi-channel input tensors from
//!   per-modality image layers stored on disk
//! - [`RotationSchedule`] — seeded circular-shift augmentation for the
//!   second image of each pair
//! - [`GroundTruth`] — pair lists and labels loaded from `.npz` archives
//!
//! The on-disk layout is one little-endian `f32` array per sample and
//! modality:
//!
//! ```text
//! <image_path>/<dir>/depth/<name>.npy              (height, width)
//! <image_path>/<dir>/normal/<name>.npy             (height, width, 3)
//! <image_path>/<dir>/probability/<name>.npy        (height, width, 20)
//! <image_path>/<dir>/probability_pca/<name>.npy    (height, width, 3)
//! <image_path>/<dir>/intensity/<name>.npy          (height, width)
//! ```
//!
//! The probability family and intensity may instead be stored as a
//! single-array `.npz` archive, which is tried after the `.npy` file.
//!
//! Everything is single-threaded and synchronous; the training loop (or a
//! prefetching driver around it) calls [`ScanPairSequence::num_batches`]
//! once and [`ScanPairSequence::get_batch`] for each index, starting every
//! pass at batch 0.

pub mod channels;
pub mod error;
pub mod ground_truth;
pub mod modality;
pub mod pairs;
mod npz;
pub mod rotation;
pub mod sequence;

pub use channels::{roll_width, ChannelAssembler, ChannelLayout};
pub use error::{DataError, Result};
pub use ground_truth::GroundTruth;
pub use modality::Modality;
pub use pairs::{Legs, PairSet};
pub use rotation::{RotationMode, RotationSchedule};
pub use sequence::{Batch, ScanPairSequence, SequenceConfig, Targets};
