use ndarray::Array2;

use crate::config::TextureConfig;
use crate::error::{QcError, Result};
use crate::features::glcm::{glcm_features, rescale_to_u8, GlcmFeatures};
use crate::features::lbp::{lbp_histogram, uniform_lbp};
use crate::features::{require_pixels, FeatureSet};

/// GLCM properties plus the fixed-width LBP histogram.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureFeatures {
    pub glcm: GlcmFeatures,
    /// `lbp_points + 2` bin densities, each in [0, 1].
    pub lbp_bins: Vec<f64>,
}

impl TextureFeatures {
    pub const GLCM_COLUMNS: [&'static str; 6] = [
        "contrast",
        "dissimilarity",
        "homogeneity",
        "energy",
        "correlation",
        "ASM",
    ];

    /// Column names for a given LBP sample-point count.
    pub fn column_names_for(lbp_points: usize) -> Vec<String> {
        Self::GLCM_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain((0..lbp_points + 2).map(|i| format!("lbp_bin_{i}")))
            .collect()
    }
}

impl FeatureSet for TextureFeatures {
    fn column_names(&self) -> Vec<String> {
        Self::column_names_for(self.lbp_bins.len().saturating_sub(2))
    }

    fn values(&self) -> Vec<f64> {
        let g = &self.glcm;
        [
            g.contrast,
            g.dissimilarity,
            g.homogeneity,
            g.energy,
            g.correlation,
            g.asm,
        ]
        .into_iter()
        .chain(self.lbp_bins.iter().copied())
        .collect()
    }
}

/// GLCM on the per-slice 8-bit rescale; LBP on the unmodified slice.
pub fn extract_texture(data: &Array2<f32>, params: &TextureConfig) -> Result<TextureFeatures> {
    require_pixels(data, "texture")?;
    if params.lbp_points == 0 {
        return Err(QcError::Precondition(
            "LBP needs at least one sample point".into(),
        ));
    }

    let image = rescale_to_u8(data);
    let glcm = glcm_features(&image, &params.distances, &params.angles);

    let codes = uniform_lbp(data, params.lbp_radius, params.lbp_points);
    let lbp_bins = lbp_histogram(&codes, params.lbp_points);

    Ok(TextureFeatures { glcm, lbp_bins })
}
