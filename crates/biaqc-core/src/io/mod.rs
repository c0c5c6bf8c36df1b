pub mod image_io;
pub mod ser;

use std::path::Path;

use crate::error::{QcError, Result};
use crate::series::SeriesSource;

/// Open a series, choosing the reader from the file extension.
pub fn open_series(path: &Path) -> Result<Box<dyn SeriesSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("ser") => Ok(Box::new(ser::SerSeries::open(path)?)),
        Some("tif" | "tiff" | "png" | "jpg" | "jpeg" | "bmp") => {
            Ok(Box::new(image_io::load_image(path)?))
        }
        _ => Err(QcError::UnsupportedFile(path.display().to_string())),
    }
}
