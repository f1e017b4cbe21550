// Crate-wide error type

use std::path::PathBuf;

use crate::modality::Modality;

/// All errors that can occur while assembling batches.
///
/// A failed sample fails its whole batch: there are no retries and no
/// partially filled tensors. Every file-level failure carries the path(s)
/// that were attempted so the offending sample can be located.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A required modality file is absent in every candidate format.
    #[error("missing {modality} image for sample '{name}': tried {tried:?}")]
    MissingModality {
        modality: Modality,
        name: String,
        tried: Vec<PathBuf>,
    },

    /// A modality file exists but could not be read or parsed.
    #[error("could not read {modality} image {}: {source}", path.display())]
    ModalityLoad {
        modality: Modality,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A loaded array does not fit its destination channel range.
    #[error("{modality} image {} has shape {got:?}, expected {expected:?}", path.display())]
    ShapeMismatch {
        modality: Modality,
        path: PathBuf,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// An orientation label falls outside the network output vector.
    #[error("orientation bin {index} of pair {row} outside network output [0, {size})")]
    OrientationOutOfRange { index: f32, size: usize, row: usize },

    /// `get_batch` was called with an index past the last batch.
    #[error("batch index {index} out of range: sequence has {num_batches} batches")]
    BatchOutOfRange { index: usize, num_batches: usize },

    /// Parallel construction arrays disagree in length.
    #[error("{what} has length {got}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// The enabled modalities need more channels than the input tensor has.
    #[error("enabled modalities occupy {enabled} channels but the input tensor has {no_channels}")]
    ChannelOverflow { enabled: usize, no_channels: usize },

    /// Invalid sequence configuration.
    #[error("{0}")]
    Config(String),

    /// A ground truth archive has an unexpected layout.
    #[error("ground truth file {}: {reason}", path.display())]
    GroundTruthFormat { path: PathBuf, reason: String },

    /// A ground truth archive could not be read.
    #[error("could not read ground truth file {}: {source}", path.display())]
    GroundTruthLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;
