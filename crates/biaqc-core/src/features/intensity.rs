use ndarray::Array2;

use crate::consts::DEFAULT_BIT_DEPTH;
use crate::error::{QcError, Result};
use crate::features::stats::{self, finite_or_zero};
use crate::features::{require_pixels, FeatureSet};

/// Largest bit depth accepted; the histogram has `2^bit_depth` bins.
const MAX_BIT_DEPTH: u32 = 16;

/// Intensity statistics of one slice.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityFeatures {
    pub mean_intensity: f64,
    pub median_intensity: f64,
    pub std_intensity: f64,
    pub variance: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub dynamic_range: f64,
    pub dynamic_range_utilization: f64,
    pub bit_depth: u32,
    /// Pixel counts over `2^bit_depth` equal bins of the normalized [0, 1] range.
    pub histogram: Vec<u64>,
    pub entropy: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl IntensityFeatures {
    pub const COLUMNS: [&'static str; 12] = [
        "mean_intensity",
        "median_intensity",
        "std_intensity",
        "variance",
        "min_intensity",
        "max_intensity",
        "dynamic_range",
        "dynamic_range_utilization",
        "bit_depth",
        "entropy",
        "skewness",
        "kurtosis",
    ];
}

impl FeatureSet for IntensityFeatures {
    fn column_names(&self) -> Vec<String> {
        Self::COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn values(&self) -> Vec<f64> {
        vec![
            self.mean_intensity,
            self.median_intensity,
            self.std_intensity,
            self.variance,
            self.min_intensity,
            self.max_intensity,
            self.dynamic_range,
            self.dynamic_range_utilization,
            self.bit_depth as f64,
            self.entropy,
            self.skewness,
            self.kurtosis,
        ]
    }
}

/// Compute intensity features of a raw slice.
///
/// `bit_depth` defaults to 12. It is never re-derived from the pixel values,
/// so slices from different acquisitions share the same bin layout.
pub fn extract_intensity(data: &Array2<f32>, bit_depth: Option<u32>) -> Result<IntensityFeatures> {
    require_pixels(data, "intensity")?;
    let bit_depth = bit_depth.unwrap_or(DEFAULT_BIT_DEPTH);
    if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
        return Err(QcError::Precondition(format!(
            "bit depth must be in 1..={MAX_BIT_DEPTH}, got {bit_depth}"
        )));
    }

    let values: Vec<f64> = data.iter().map(|&v| v as f64).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let full_scale = ((1u64 << bit_depth) - 1) as f64;
    let variance = stats::variance(&values);

    let normalized: Vec<f64> = values.iter().map(|v| v / full_scale).collect();
    let histogram = normalized_histogram(&normalized, 1usize << bit_depth);

    Ok(IntensityFeatures {
        mean_intensity: stats::mean(&values),
        median_intensity: stats::median(&values),
        std_intensity: variance.sqrt(),
        variance,
        min_intensity: min,
        max_intensity: max,
        dynamic_range: max - min,
        dynamic_range_utilization: (max - min) / full_scale,
        bit_depth,
        entropy: finite_or_zero(stats::entropy(&histogram)),
        skewness: finite_or_zero(stats::skewness(&normalized)),
        kurtosis: finite_or_zero(stats::kurtosis(&normalized)),
        histogram,
    })
}

/// Equal-width histogram over [0, 1]. Out-of-range values land in the end
/// bins so every pixel is counted exactly once.
fn normalized_histogram(normalized: &[f64], bins: usize) -> Vec<u64> {
    let mut hist = vec![0u64; bins];
    let last = bins - 1;
    for &v in normalized {
        let idx = if v.is_nan() || v <= 0.0 {
            0
        } else {
            ((v * bins as f64) as usize).min(last)
        };
        hist[idx] += 1;
    }
    hist
}
