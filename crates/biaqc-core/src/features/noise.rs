use ndarray::Array2;

use crate::consts::{DB2_DEC_HI, MAD_TO_SIGMA};
use crate::error::Result;
use crate::features::stats::{self, finite_or_zero};
use crate::features::{require_pixels, FeatureSet};

const ZERO_COEFFICIENT_TOLERANCE: f64 = 1e-10;

#[derive(Clone, Debug, PartialEq)]
pub struct NoiseFeatures {
    /// Wavelet-based Gaussian noise sigma.
    pub noise_level: f64,
    /// Mean over standard deviation; 0 for a flat slice.
    pub snr: f64,
}

impl NoiseFeatures {
    pub const COLUMNS: [&'static str; 2] = ["noise_level", "snr"];
}

impl FeatureSet for NoiseFeatures {
    fn column_names(&self) -> Vec<String> {
        Self::COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn values(&self) -> Vec<f64> {
        vec![self.noise_level, self.snr]
    }
}

pub fn extract_noise(data: &Array2<f32>) -> Result<NoiseFeatures> {
    require_pixels(data, "noise")?;
    let values: Vec<f64> = data.iter().map(|&v| v as f64).collect();
    let mean = stats::mean(&values);
    let std = stats::variance(&values).sqrt();
    let snr = if std == 0.0 { 0.0 } else { mean / std };

    Ok(NoiseFeatures {
        noise_level: finite_or_zero(estimate_sigma(data)),
        snr: finite_or_zero(snr),
    })
}

/// Robust noise sigma from the diagonal detail band of a one-level
/// Daubechies-2 wavelet transform: `median(|HH|) / 0.6745`.
///
/// Zero coefficients (up to round-off relative to the slice's magnitude) are
/// ignored. Returns NaN when none remain, e.g. for a flat slice.
pub fn estimate_sigma(data: &Array2<f32>) -> f64 {
    let scale = data.iter().fold(0.0f64, |m, &v| m.max((v as f64).abs()));
    let tolerance = ZERO_COEFFICIENT_TOLERANCE * scale;
    let hh = diagonal_detail(data);
    let abs: Vec<f64> = hh
        .iter()
        .map(|v| v.abs())
        .filter(|&v| v > tolerance)
        .collect();
    stats::median(&abs) / MAD_TO_SIGMA
}

/// High-pass along rows, then along columns, each followed by downsampling by two.
fn diagonal_detail(data: &Array2<f32>) -> Array2<f64> {
    let (h, w) = data.dim();
    let out_w = dwt_len(w);
    let out_h = dwt_len(h);

    let mut row_pass = Array2::<f64>::zeros((h, out_w));
    let mut buf: Vec<f64> = Vec::with_capacity(w.max(h));
    for row in 0..h {
        buf.clear();
        buf.extend(data.row(row).iter().map(|&v| v as f64));
        for (col, v) in dwt_highpass(&buf).into_iter().enumerate() {
            row_pass[[row, col]] = v;
        }
    }

    let mut result = Array2::<f64>::zeros((out_h, out_w));
    for col in 0..out_w {
        buf.clear();
        buf.extend(row_pass.column(col).iter().copied());
        for (row, v) in dwt_highpass(&buf).into_iter().enumerate() {
            result[[row, col]] = v;
        }
    }
    result
}

fn dwt_len(n: usize) -> usize {
    (n + DB2_DEC_HI.len() - 1) / 2
}

/// Single-level analysis with symmetric (half-sample) extension.
fn dwt_highpass(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let taps = DB2_DEC_HI.len() as isize;
    (0..dwt_len(n))
        .map(|o| {
            let centre = 2 * o as isize + 1;
            (0..taps)
                .map(|j| DB2_DEC_HI[j as usize] * signal[symmetric_index(centre - j, n)])
                .sum()
        })
        .collect()
}

/// Half-sample symmetric boundary: `x[-1] = x[0]`, `x[n] = x[n-1]`.
fn symmetric_index(idx: isize, size: usize) -> usize {
    let period = 2 * size as isize;
    let m = idx.rem_euclid(period) as usize;
    if m < size {
        m
    } else {
        2 * size - 1 - m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_extension_mirrors_edges() {
        assert_eq!(symmetric_index(-1, 4), 0);
        assert_eq!(symmetric_index(-2, 4), 1);
        assert_eq!(symmetric_index(4, 4), 3);
        assert_eq!(symmetric_index(5, 4), 2);
        assert_eq!(symmetric_index(2, 4), 2);
    }

    #[test]
    fn highpass_kills_constant_signal() {
        let out = dwt_highpass(&[3.0; 9]);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| v.abs() < 1e-12));
    }
}
