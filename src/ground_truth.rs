// Ground truth loading — pair lists and labels from .npz archives
//
// Each archive holds one float array of shape (n, >=5) whose columns are
//
//   (frame1, frame2, overlap, function_angle, orientation)
//
// Frame ids become zero-padded six-digit filenames, matching the names the
// range-image preprocessing writes. Several archives can be concatenated,
// and the combined rows shuffled reproducibly. This archive layout stores
// no dataset directory names; attach them with `with_dirs` when the data
// spans more than one sequence directory.

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::{NpzReader, ReadNpzError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{DataError, Result};
use crate::pairs::PairSet;

/// Pair filenames, directory names, and labels loaded from ground truth
/// archives. All vectors are parallel.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    pub filenames1: Vec<String>,
    pub filenames2: Vec<String>,
    pub dir1: Vec<String>,
    pub dir2: Vec<String>,
    pub overlap: Vec<f32>,
    pub function_angle: Vec<f32>,
    pub orientation: Vec<f32>,
}

impl GroundTruth {
    /// Load and concatenate the given archives, in order.
    ///
    /// Passing a `seed` shuffles the combined pair order reproducibly;
    /// `None` keeps file order. Directory names come back as empty strings
    /// (see [`GroundTruth::with_dirs`]).
    pub fn load_npz<P: AsRef<Path>>(paths: &[P], seed: Option<u64>) -> Result<Self> {
        let mut out = GroundTruth::default();
        for path in paths {
            out.append_archive(path.as_ref())?;
        }

        if let Some(seed) = seed {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut order: Vec<usize> = (0..out.len()).collect();
            order.shuffle(&mut rng);
            out.reorder(&order);
        }

        Ok(out)
    }

    fn append_archive(&mut self, path: &Path) -> Result<()> {
        let wrap = |e: Box<dyn std::error::Error + Send + Sync>| DataError::GroundTruthLoad {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::open(path).map_err(|e| wrap(Box::new(e)))?;
        let mut npz = NpzReader::new(file).map_err(|e| wrap(Box::new(e)))?;
        let names = npz.names().map_err(|e| wrap(Box::new(e)))?;
        let first = names.first().ok_or_else(|| DataError::GroundTruthFormat {
            path: path.to_path_buf(),
            reason: "archive contains no arrays".to_string(),
        })?;

        let table = read_table(&mut npz, first).map_err(|e| wrap(Box::new(e)))?;
        if table.ncols() < 5 {
            return Err(DataError::GroundTruthFormat {
                path: path.to_path_buf(),
                reason: format!("expected at least 5 columns, got {}", table.ncols()),
            });
        }

        for row in table.rows() {
            self.filenames1.push(format!("{:06}", row[0] as i64));
            self.filenames2.push(format!("{:06}", row[1] as i64));
            self.dir1.push(String::new());
            self.dir2.push(String::new());
            self.overlap.push(row[2] as f32);
            self.function_angle.push(row[3] as f32);
            self.orientation.push(row[4] as f32);
        }
        Ok(())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.filenames1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames1.is_empty()
    }

    /// Attach dataset directory names to both legs.
    pub fn with_dirs(mut self, dir1: Vec<String>, dir2: Vec<String>) -> Result<Self> {
        let n = self.len();
        if dir1.len() != n {
            return Err(DataError::LengthMismatch {
                what: "dir1",
                expected: n,
                got: dir1.len(),
            });
        }
        if dir2.len() != n {
            return Err(DataError::LengthMismatch {
                what: "dir2",
                expected: n,
                got: dir2.len(),
            });
        }
        self.dir1 = dir1;
        self.dir2 = dir2;
        Ok(self)
    }

    /// Convert into a [`PairSet`] ready for batching.
    pub fn into_pair_set(self) -> Result<PairSet> {
        PairSet::new(
            self.filenames1,
            self.dir1,
            self.filenames2,
            self.dir2,
            Array1::from(self.overlap),
            Array1::from(self.function_angle),
            Array1::from(self.orientation),
        )
    }

    fn reorder(&mut self, order: &[usize]) {
        fn permute<T: Clone>(v: &[T], order: &[usize]) -> Vec<T> {
            order.iter().map(|&i| v[i].clone()).collect()
        }
        self.filenames1 = permute(&self.filenames1, order);
        self.filenames2 = permute(&self.filenames2, order);
        self.dir1 = permute(&self.dir1, order);
        self.dir2 = permute(&self.dir2, order);
        self.overlap = permute(&self.overlap, order);
        self.function_angle = permute(&self.function_angle, order);
        self.orientation = permute(&self.orientation, order);
    }
}

/// Read the label table, accepting both f64 (numpy's default) and f32.
fn read_table(
    npz: &mut NpzReader<File>,
    name: &str,
) -> std::result::Result<Array2<f64>, ReadNpzError> {
    let as_f64: std::result::Result<Array2<f64>, ReadNpzError> = crate::npz::read_entry(npz, name);
    match as_f64 {
        Ok(table) => Ok(table),
        Err(first_err) => {
            let as_f32: std::result::Result<Array2<f32>, ReadNpzError> =
                crate::npz::read_entry(npz, name);
            match as_f32 {
                Ok(table) => Ok(table.mapv(f64::from)),
                Err(_) => Err(first_err),
            }
        }
    }
}
