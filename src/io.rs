use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::ImageReader;
use ndarray::{Array2, Array3};
use ndarray_npy::ReadNpyExt;

use crate::batch::BoundaryRecord;
use crate::mask::{Mask, argmax_classes};

/// Load a mask from disk.
///
/// `.npy` files hold either a 2D class-id array or a 3D (rows, cols, classes)
/// score array that is reduced with argmax. Everything else is decoded as an
/// image whose first channel carries the class id.
pub fn load_mask(path: impl AsRef<Path>) -> Result<Mask> {
    let path = path.as_ref();
    let is_npy = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("npy"));

    if is_npy {
        return load_npy_mask(path);
    }

    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open mask {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode mask {}: {}", path.display(), e))?;
    Ok(Mask::from_image(&img)?)
}

pub fn load_npy_mask(path: &Path) -> Result<Mask> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    macro_rules! try_class_ids {
        ($($t:ty),*) => {$(
            if let Ok(array) = Array2::<$t>::read_npy(bytes.as_slice()) {
                return Ok(Mask::from_array(array.view())?);
            }
        )*};
    }
    try_class_ids!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, bool);

    if let Ok(scores) = Array3::<f32>::read_npy(bytes.as_slice()) {
        let classes = argmax_classes(scores.view())?;
        return Ok(Mask::from_array(classes.view())?);
    }
    if let Ok(scores) = Array3::<f64>::read_npy(bytes.as_slice()) {
        let classes = argmax_classes(scores.view())?;
        return Ok(Mask::from_array(classes.view())?);
    }

    bail!(
        "Unsupported .npy mask {}: expected a 2D numeric or 3D float array",
        path.display()
    )
}

/// Write records as pretty-printed JSON
pub fn write_records(path: impl AsRef<Path>, records: &[BoundaryRecord]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Job name for a mask file: its file stem, falling back to the full path
pub fn job_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One job name per path, in order. Repeated stems get `_2`, `_3`, ...
/// so records and debug images stay distinct.
pub fn job_names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let stem = job_name(path.as_ref());
            let mut name = stem.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{}_{}", stem, n);
            }
            name
        })
        .collect()
}
