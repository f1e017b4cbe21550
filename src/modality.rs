// Modality catalogue — per-sample image layers and their on-disk formats
//
// Every sample is stored as one numeric array per modality:
//
//   <image_path>/<dir>/depth/<name>.npy            (height, width)
//   <image_path>/<dir>/normal/<name>.npy           (height, width, 3)
//   <image_path>/<dir>/probability/<name>.npy      (height, width, 20)
//   <image_path>/<dir>/probability_pca/<name>.npy  (height, width, 3)
//   <image_path>/<dir>/intensity/<name>.npy        (height, width)
//
// Arrays are little-endian f32. The probability family and intensity may
// instead be stored as a single-array .npz archive; the .npy file is tried
// first, the .npz archive second.

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD};
use ndarray_npy::{NpzReader, ReadNpyExt, ReadNpzError};

use crate::error::{DataError, Result};

/// A named data layer stored as a separate file per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Depth,
    Normals,
    Probability,
    ProbabilityPca,
    Intensity,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Modality::Depth => "depth",
            Modality::Normals => "normals",
            Modality::Probability => "probability",
            Modality::ProbabilityPca => "probability (PCA)",
            Modality::Intensity => "intensity",
        })
    }
}

impl Modality {
    /// Subdirectory holding this modality's files.
    pub fn subdir(self) -> &'static str {
        match self {
            Modality::Depth => "depth",
            Modality::Normals => "normal",
            Modality::Probability => "probability",
            Modality::ProbabilityPca => "probability_pca",
            Modality::Intensity => "intensity",
        }
    }

    /// Number of channels this modality occupies in the input tensor.
    pub fn channels(self) -> usize {
        match self {
            Modality::Depth | Modality::Intensity => 1,
            Modality::Normals | Modality::ProbabilityPca => 3,
            Modality::Probability => 20,
        }
    }

    /// Whether a `.npz` archive is accepted when the `.npy` file is absent.
    pub fn has_archive_fallback(self) -> bool {
        matches!(
            self,
            Modality::Probability | Modality::ProbabilityPca | Modality::Intensity
        )
    }

    /// The on-disk shape of one sample of this modality.
    pub fn expected_shape(self, height: usize, width: usize) -> Vec<usize> {
        match self.channels() {
            1 => vec![height, width],
            k => vec![height, width, k],
        }
    }

    /// Candidate file paths for one sample, in the order they are attempted.
    pub fn candidate_paths(self, image_path: &Path, dir: &str, name: &str) -> Vec<PathBuf> {
        let stem = image_path.join(dir).join(self.subdir());
        let mut candidates = vec![stem.join(format!("{name}.npy"))];
        if self.has_archive_fallback() {
            candidates.push(stem.join(format!("{name}.npz")));
        }
        candidates
    }

    /// Load this modality for one sample as an `(height, width, channels)`
    /// array. Single-channel modalities are stored on disk as
    /// `(height, width)` and get a trailing channel axis here.
    ///
    /// Candidates are attempted in order and the first successful load wins.
    /// If every candidate is missing the error names all attempted paths; if
    /// a candidate exists but fails to load, the last such failure is
    /// surfaced. A wrong array shape is fatal immediately — it would not be
    /// fixed by another container format.
    pub fn load(
        self,
        image_path: &Path,
        dir: &str,
        name: &str,
        height: usize,
        width: usize,
    ) -> Result<Array3<f32>> {
        let candidates = self.candidate_paths(image_path, dir, name);
        let mut last_err = None;

        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match self.load_file(path) {
                Ok(arr) => return self.check_shape(arr, path, height, width),
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => e,
            None => DataError::MissingModality {
                modality: self,
                name: name.to_string(),
                tried: candidates,
            },
        })
    }

    fn load_file(self, path: &Path) -> Result<ArrayD<f32>> {
        let is_archive = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("npz"))
            .unwrap_or(false);

        let file = File::open(path).map_err(|e| DataError::ModalityLoad {
            modality: self,
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        if is_archive {
            self.load_archive(file, path)
        } else {
            ArrayD::<f32>::read_npy(file).map_err(|e| DataError::ModalityLoad {
                modality: self,
                path: path.to_path_buf(),
                source: Box::new(e),
            })
        }
    }

    /// Read the single array out of a `.npz` archive, whatever its entry name.
    fn load_archive(self, file: File, path: &Path) -> Result<ArrayD<f32>> {
        let wrap = |e: ReadNpzError| DataError::ModalityLoad {
            modality: self,
            path: path.to_path_buf(),
            source: Box::new(e),
        };

        let mut npz = NpzReader::new(file).map_err(wrap)?;
        let names = npz.names().map_err(wrap)?;
        let first = names.first().ok_or_else(|| DataError::ModalityLoad {
            modality: self,
            path: path.to_path_buf(),
            source: "archive contains no arrays".into(),
        })?;
        crate::npz::read_entry(&mut npz, first).map_err(wrap)
    }

    fn check_shape(
        self,
        arr: ArrayD<f32>,
        path: &Path,
        height: usize,
        width: usize,
    ) -> Result<Array3<f32>> {
        let expected = self.expected_shape(height, width);
        if arr.shape() != expected.as_slice() {
            return Err(DataError::ShapeMismatch {
                modality: self,
                path: path.to_path_buf(),
                expected,
                got: arr.shape().to_vec(),
            });
        }
        arr.into_shape((height, width, self.channels()))
            .map_err(|_| DataError::ShapeMismatch {
                modality: self,
                path: path.to_path_buf(),
                expected: vec![height, width, self.channels()],
                got: vec![],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use ndarray_npy::{NpzWriter, WriteNpyExt};
    use std::fs;

    fn write_npy(path: &Path, arr: &ArrayD<f32>) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        arr.write_npy(File::create(path).unwrap()).unwrap();
    }

    fn write_npz(path: &Path, arr: &ArrayD<f32>) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array("arr_0", arr).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn subdirs_and_channel_widths() {
        assert_eq!(Modality::Depth.subdir(), "depth");
        assert_eq!(Modality::Normals.subdir(), "normal");
        assert_eq!(Modality::Probability.subdir(), "probability");
        assert_eq!(Modality::ProbabilityPca.subdir(), "probability_pca");
        assert_eq!(Modality::Intensity.subdir(), "intensity");

        assert_eq!(Modality::Depth.channels(), 1);
        assert_eq!(Modality::Normals.channels(), 3);
        assert_eq!(Modality::Probability.channels(), 20);
        assert_eq!(Modality::ProbabilityPca.channels(), 3);
        assert_eq!(Modality::Intensity.channels(), 1);
    }

    #[test]
    fn fallback_only_for_probability_and_intensity() {
        assert!(!Modality::Depth.has_archive_fallback());
        assert!(!Modality::Normals.has_archive_fallback());
        assert!(Modality::Probability.has_archive_fallback());
        assert!(Modality::ProbabilityPca.has_archive_fallback());
        assert!(Modality::Intensity.has_archive_fallback());
    }

    #[test]
    fn candidate_paths_in_order() {
        let root = Path::new("/data");
        let paths = Modality::Depth.candidate_paths(root, "07", "000123");
        assert_eq!(paths, vec![PathBuf::from("/data/07/depth/000123.npy")]);

        let paths = Modality::Intensity.candidate_paths(root, "07", "000123");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/07/intensity/000123.npy"),
                PathBuf::from("/data/07/intensity/000123.npz"),
            ]
        );
    }

    #[test]
    fn load_depth_npy() {
        let tmp = tempfile::tempdir().unwrap();
        let depth = Array2::from_shape_fn((2, 4), |(r, c)| (r * 4 + c) as f32);
        write_npy(
            &tmp.path().join("seq/depth/000000.npy"),
            &depth.clone().into_dyn(),
        );

        let loaded = Modality::Depth
            .load(tmp.path(), "seq", "000000", 2, 4)
            .unwrap();
        assert_eq!(loaded.shape(), &[2, 4, 1]);
        assert_eq!(loaded[[1, 3, 0]], 7.0);
    }

    #[test]
    fn load_intensity_from_archive_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let intensity = Array2::from_elem((2, 3), 0.5f32).into_dyn();
        write_npz(&tmp.path().join("seq/intensity/000001.npz"), &intensity);

        let loaded = Modality::Intensity
            .load(tmp.path(), "seq", "000001", 2, 3)
            .unwrap();
        assert_eq!(loaded.shape(), &[2, 3, 1]);
        assert_eq!(loaded[[0, 0, 0]], 0.5);
    }

    #[test]
    fn npy_preferred_over_npz() {
        let tmp = tempfile::tempdir().unwrap();
        let primary = Array2::from_elem((1, 2), 1.0f32).into_dyn();
        let fallback = Array2::from_elem((1, 2), 2.0f32).into_dyn();
        write_npy(&tmp.path().join("seq/intensity/000002.npy"), &primary);
        write_npz(&tmp.path().join("seq/intensity/000002.npz"), &fallback);

        let loaded = Modality::Intensity
            .load(tmp.path(), "seq", "000002", 1, 2)
            .unwrap();
        assert_eq!(loaded[[0, 0, 0]], 1.0);
    }

    #[test]
    fn missing_file_names_attempted_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Modality::Probability
            .load(tmp.path(), "seq", "000003", 2, 2)
            .unwrap_err();
        match err {
            DataError::MissingModality {
                modality, tried, ..
            } => {
                assert_eq!(modality, Modality::Probability);
                assert_eq!(tried.len(), 2);
                assert!(tried[0].ends_with("seq/probability/000003.npy"));
                assert!(tried[1].ends_with("seq/probability/000003.npz"));
            }
            other => panic!("expected MissingModality, got {other:?}"),
        }
    }

    #[test]
    fn depth_has_no_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        // A depth .npz exists, but depth only accepts .npy.
        let depth = Array2::zeros((2, 2)).into_dyn();
        write_npz(&tmp.path().join("seq/depth/000004.npz"), &depth);

        let err = Modality::Depth
            .load(tmp.path(), "seq", "000004", 2, 2)
            .unwrap_err();
        assert!(matches!(err, DataError::MissingModality { .. }));
    }

    #[test]
    fn wrong_shape_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let normals = Array3::zeros((2, 2, 2)).into_dyn(); // should be (h, w, 3)
        write_npy(&tmp.path().join("seq/normal/000005.npy"), &normals);

        let err = Modality::Normals
            .load(tmp.path(), "seq", "000005", 2, 2)
            .unwrap_err();
        match err {
            DataError::ShapeMismatch { expected, got, .. } => {
                assert_eq!(expected, vec![2, 2, 3]);
                assert_eq!(got, vec![2, 2, 2]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }
}
