// Sample pairs — parallel filename, directory, and label arrays

use ndarray::Array1;

use crate::error::{DataError, Result};

/// Presence of the second image of each pair, decided once at construction
/// and never re-checked per call.
#[derive(Debug, Clone)]
pub enum Legs {
    /// Only the first image list is populated.
    Single,
    /// Both images of each pair are available.
    Paired {
        filenames2: Vec<String>,
        dirs2: Vec<String>,
    },
}

/// An ordered set of sample pairs with their scalar labels.
///
/// All arrays are parallel: entry `i` of every array describes pair `i`.
/// `overlap` and `function_angle` are in `[0, 1]`; `orientation` is the
/// index of the expected peak in the network output vector, stored as a
/// float because that is how the label files carry it.
#[derive(Debug, Clone)]
pub struct PairSet {
    filenames1: Vec<String>,
    dirs1: Vec<String>,
    legs: Legs,
    overlap: Array1<f32>,
    function_angle: Array1<f32>,
    orientation: Array1<f32>,
}

impl PairSet {
    /// Build a pair set from parallel arrays.
    ///
    /// An empty `filenames2` selects single-leg mode (`dirs2` is ignored
    /// then); otherwise both second-leg arrays must be fully populated.
    /// Every array must have the same length as `filenames1`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filenames1: Vec<String>,
        dirs1: Vec<String>,
        filenames2: Vec<String>,
        dirs2: Vec<String>,
        overlap: Array1<f32>,
        function_angle: Array1<f32>,
        orientation: Array1<f32>,
    ) -> Result<Self> {
        let n = filenames1.len();
        check_len("dir1", n, dirs1.len())?;
        check_len("overlap", n, overlap.len())?;
        check_len("function_angle", n, function_angle.len())?;
        check_len("orientation", n, orientation.len())?;

        let legs = if filenames2.is_empty() {
            Legs::Single
        } else {
            check_len("imgfilenames2", n, filenames2.len())?;
            check_len("dir2", n, dirs2.len())?;
            Legs::Paired { filenames2, dirs2 }
        };

        Ok(Self {
            filenames1,
            dirs1,
            legs,
            overlap,
            function_angle,
            orientation,
        })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.filenames1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames1.is_empty()
    }

    /// Whether a second leg is available.
    pub fn is_paired(&self) -> bool {
        matches!(self.legs, Legs::Paired { .. })
    }

    /// First-leg filename of pair `i`.
    pub fn filename1(&self, i: usize) -> &str {
        &self.filenames1[i]
    }

    /// First-leg dataset directory of pair `i`.
    pub fn dir1(&self, i: usize) -> &str {
        &self.dirs1[i]
    }

    /// Second-leg `(filename, directory)` of pair `i`, if paired.
    pub fn leg2(&self, i: usize) -> Option<(&str, &str)> {
        match &self.legs {
            Legs::Single => None,
            Legs::Paired { filenames2, dirs2 } => {
                Some((filenames2[i].as_str(), dirs2[i].as_str()))
            }
        }
    }

    pub fn overlap(&self) -> &Array1<f32> {
        &self.overlap
    }

    pub fn function_angle(&self) -> &Array1<f32> {
        &self.function_angle
    }

    pub fn orientation(&self) -> &Array1<f32> {
        &self.orientation
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(DataError::LengthMismatch {
            what,
            expected,
            got,
        })
    }
}
