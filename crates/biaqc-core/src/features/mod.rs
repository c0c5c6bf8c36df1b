pub mod glcm;
pub mod intensity;
pub mod lbp;
pub mod noise;
pub mod sharpness;
pub mod stats;
pub mod texture;

use ndarray::Array2;

use crate::error::{QcError, Result};

pub use intensity::{extract_intensity, IntensityFeatures};
pub use noise::{extract_noise, NoiseFeatures};
pub use sharpness::{extract_sharpness, SharpnessFeatures};
pub use texture::{extract_texture, TextureFeatures};

/// A family of scalar features that flattens into named table columns.
pub trait FeatureSet {
    fn column_names(&self) -> Vec<String>;

    /// Values in the same order as [`FeatureSet::column_names`].
    fn values(&self) -> Vec<f64>;

    fn columns(&self) -> Vec<(String, f64)> {
        self.column_names().into_iter().zip(self.values()).collect()
    }
}

pub(crate) fn require_pixels(data: &Array2<f32>, extractor: &str) -> Result<()> {
    if data.is_empty() {
        return Err(QcError::Precondition(format!(
            "{extractor} extractor needs a non-empty slice, got {:?}",
            data.dim()
        )));
    }
    Ok(())
}
