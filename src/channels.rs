// Channel assembly — compose one multi-channel sample from modality layers
//
// Channel order is fixed: depth (1), normals (3), class probabilities
// (20, or 3 in PCA-reduced form), intensity (1). Each enabled modality
// occupies the next contiguous channel range; disabled modalities leave
// no gap.

use std::path::{Path, PathBuf};

use ndarray::{s, ArrayViewMut3, Axis};

use crate::error::Result;
use crate::modality::Modality;

/// Which modality layers make up the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub use_depth: bool,
    pub use_normals: bool,
    pub use_class_probabilities: bool,
    /// Use the 3-channel PCA reduction instead of the full 20 probability
    /// channels. Only relevant when `use_class_probabilities` is set.
    pub use_class_probabilities_pca: bool,
    pub use_intensity: bool,
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self {
            use_depth: true,
            use_normals: true,
            use_class_probabilities: false,
            use_class_probabilities_pca: false,
            use_intensity: false,
        }
    }
}

impl ChannelLayout {
    pub fn depth(mut self, on: bool) -> Self {
        self.use_depth = on;
        self
    }

    pub fn normals(mut self, on: bool) -> Self {
        self.use_normals = on;
        self
    }

    pub fn class_probabilities(mut self, on: bool) -> Self {
        self.use_class_probabilities = on;
        self
    }

    pub fn class_probabilities_pca(mut self, on: bool) -> Self {
        self.use_class_probabilities_pca = on;
        self
    }

    pub fn intensity(mut self, on: bool) -> Self {
        self.use_intensity = on;
        self
    }

    /// Enabled modalities in their fixed channel order.
    pub fn enabled(&self) -> Vec<Modality> {
        let mut out = Vec::new();
        if self.use_depth {
            out.push(Modality::Depth);
        }
        if self.use_normals {
            out.push(Modality::Normals);
        }
        if self.use_class_probabilities {
            out.push(if self.use_class_probabilities_pca {
                Modality::ProbabilityPca
            } else {
                Modality::Probability
            });
        }
        if self.use_intensity {
            out.push(Modality::Intensity);
        }
        out
    }

    /// Total number of channels the enabled modalities occupy.
    pub fn channel_count(&self) -> usize {
        self.enabled().iter().map(|m| m.channels()).sum()
    }
}

/// Loads the enabled modality layers for one sample and writes them into a
/// slot of the batch tensor.
///
/// The assembler is pure with respect to everything but the destination
/// view: it holds only the base path, the layout, and the image size.
#[derive(Debug, Clone)]
pub struct ChannelAssembler {
    image_path: PathBuf,
    layout: ChannelLayout,
    height: usize,
    width: usize,
}

impl ChannelAssembler {
    pub fn new(
        image_path: impl Into<PathBuf>,
        layout: ChannelLayout,
        height: usize,
        width: usize,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            layout,
            height,
            width,
        }
    }

    /// The directory all sample files are resolved against.
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Assemble one sample into `dest`, a zero-initialized
    /// `(height, width, no_channels)` view. Channels past the enabled range
    /// stay zero. When `shift` is given, the fully assembled sample is
    /// circularly rolled along the width axis afterwards.
    ///
    /// Any load failure aborts assembly and propagates; a partially filled
    /// slot is never returned as success.
    pub fn fill_sample(
        &self,
        mut dest: ArrayViewMut3<'_, f32>,
        name: &str,
        dir: &str,
        shift: Option<usize>,
    ) -> Result<()> {
        let mut offset = 0;
        for modality in self.layout.enabled() {
            let layer = modality.load(&self.image_path, dir, name, self.height, self.width)?;
            let k = modality.channels();
            dest.slice_mut(s![.., .., offset..offset + k]).assign(&layer);
            offset += k;
        }

        if let Some(shift) = shift {
            roll_width(dest, shift);
        }
        Ok(())
    }
}

/// Circularly shift a `(height, width, channels)` sample along the width
/// axis: the column at index `i` moves to `(i + shift) % width`, with
/// wrap-around rather than padding.
pub fn roll_width(mut sample: ArrayViewMut3<'_, f32>, shift: usize) {
    let width = sample.len_of(Axis(1));
    if width == 0 {
        return;
    }
    let shift = shift % width;
    if shift == 0 {
        return;
    }

    let original = sample.to_owned();
    for col in 0..width {
        let dst = (col + shift) % width;
        sample
            .slice_mut(s![.., dst, ..])
            .assign(&original.slice(s![.., col, ..]));
    }
}
