// Small .npz access helpers shared by the modality and ground-truth loaders.

use std::fs::File;

use ndarray::{ArrayBase, DataOwned, Dimension};
use ndarray_npy::{NpzReader, ReadNpzError, ReadableElement};

/// Read the entry called `name`, tolerating archives that store entry names
/// with or without the `.npy` suffix.
pub(crate) fn read_entry<S, D>(
    npz: &mut NpzReader<File>,
    name: &str,
) -> Result<ArrayBase<S, D>, ReadNpzError>
where
    S: DataOwned,
    S::Elem: ReadableElement,
    D: Dimension,
{
    match npz.by_name(name) {
        Ok(arr) => Ok(arr),
        Err(err) => {
            let alternate = match name.strip_suffix(".npy") {
                Some(stripped) => stripped.to_string(),
                None => format!("{name}.npy"),
            };
            npz.by_name(&alternate).map_err(|_| err)
        }
    }
}
