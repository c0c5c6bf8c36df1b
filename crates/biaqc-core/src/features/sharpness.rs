use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::Result;
use crate::features::stats::finite_or_zero;
use crate::features::{require_pixels, FeatureSet};

/// Focus measures of one slice. Higher means sharper for all four.
#[derive(Clone, Debug, PartialEq)]
pub struct SharpnessFeatures {
    pub laplacian: f64,
    pub tenengrad: f64,
    pub brenners_gradient: f64,
    pub fourier_magnitude: f64,
}

impl SharpnessFeatures {
    pub const COLUMNS: [&'static str; 4] = [
        "laplacian",
        "tenengrad",
        "brenners_gradient",
        "fourier_magnitude",
    ];
}

impl FeatureSet for SharpnessFeatures {
    fn column_names(&self) -> Vec<String> {
        Self::COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn values(&self) -> Vec<f64> {
        vec![
            self.laplacian,
            self.tenengrad,
            self.brenners_gradient,
            self.fourier_magnitude,
        ]
    }
}

pub fn extract_sharpness(data: &Array2<f32>) -> Result<SharpnessFeatures> {
    require_pixels(data, "sharpness")?;
    Ok(SharpnessFeatures {
        laplacian: finite_or_zero(laplacian_variance(data)),
        tenengrad: finite_or_zero(tenengrad(data)),
        brenners_gradient: finite_or_zero(brenner_gradient(data)),
        fourier_magnitude: finite_or_zero(fourier_sharpness(data)),
    })
}

/// Variance of the 4-neighbour Laplacian over the whole slice:
///   0  1  0
///   1 -4  1
///   0  1  0
/// Borders use reflect-101 extension.
pub fn laplacian_variance(data: &Array2<f32>) -> f64 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }
    let at = |r: isize, c: isize| data[[reflect_101(r, h), reflect_101(c, w)]] as f64;

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for row in 0..h as isize {
        for col in 0..w as isize {
            let lap = -4.0 * at(row, col)
                + at(row - 1, col)
                + at(row + 1, col)
                + at(row, col - 1)
                + at(row, col + 1);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let count = (h * w) as f64;
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Mean Sobel gradient magnitude (Tenengrad), accumulated in f64.
///
///   Gx = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]
///   Gy = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]]
pub fn tenengrad(data: &Array2<f32>) -> f64 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }
    let at = |r: isize, c: isize| data[[reflect_101(r, h), reflect_101(c, w)]] as f64;

    let mut sum = 0.0f64;
    for row in 0..h as isize {
        for col in 0..w as isize {
            let gx = -at(row - 1, col - 1) + at(row - 1, col + 1) - 2.0 * at(row, col - 1)
                + 2.0 * at(row, col + 1)
                - at(row + 1, col - 1)
                + at(row + 1, col + 1);

            let gy = -at(row - 1, col - 1) - 2.0 * at(row - 1, col) - at(row - 1, col + 1)
                + at(row + 1, col - 1)
                + 2.0 * at(row + 1, col)
                + at(row + 1, col + 1);

            sum += (gx * gx + gy * gy).sqrt();
        }
    }

    sum / (h * w) as f64
}

/// Brenner's gradient: Σ (I[r+2, c] − I[r, c])², rows wrap around.
pub fn brenner_gradient(data: &Array2<f32>) -> f64 {
    let (h, w) = data.dim();
    let mut sum = 0.0f64;
    for row in 0..h {
        let shifted = (row + 2) % h;
        for col in 0..w {
            let d = data[[shifted, col]] as f64 - data[[row, col]] as f64;
            sum += d * d;
        }
    }
    sum
}

/// Mean of `20·log10(|F| + 1)` over the centred 2D spectrum.
pub fn fourier_sharpness(data: &Array2<f32>) -> f64 {
    let spectrum = magnitude_spectrum(data);
    if spectrum.is_empty() {
        return 0.0;
    }
    spectrum.sum() / spectrum.len() as f64
}

/// Log-magnitude spectrum in decibels with the zero frequency at the centre.
pub fn magnitude_spectrum(data: &Array2<f32>) -> Array2<f64> {
    let freq = fft2d(data);
    let (h, w) = freq.dim();
    let mut shifted = Array2::<f64>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let magnitude = freq[[row, col]].norm();
            shifted[[(row + h / 2) % h, (col + w / 2) % w]] = 20.0 * (magnitude + 1.0).log10();
        }
    }
    shifted
}

fn fft2d(data: &Array2<f32>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut result = data.mapv(|v| Complex::new(v as f64, 0.0));
    if h == 0 || w == 0 {
        return result;
    }

    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    // Row-wise FFT
    let mut row_data: Vec<Complex<f64>> = Vec::with_capacity(w);
    for row in 0..h {
        row_data.clear();
        row_data.extend(result.row(row).iter().copied());
        fft_row.process(&mut row_data);
        for (col, v) in row_data.iter().enumerate() {
            result[[row, col]] = *v;
        }
    }

    // Column-wise FFT
    let mut col_data: Vec<Complex<f64>> = Vec::with_capacity(h);
    for col in 0..w {
        col_data.clear();
        col_data.extend(result.column(col).iter().copied());
        fft_col.process(&mut col_data);
        for (row, v) in col_data.iter().enumerate() {
            result[[row, col]] = *v;
        }
    }

    result
}

/// Reflect-101 boundary (`dcb|abcd|cba`), as used by the usual 3x3 derivative filters.
pub(crate) fn reflect_101(idx: isize, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let period = 2 * (size as isize - 1);
    let m = idx.rem_euclid(period) as usize;
    if m < size {
        m
    } else {
        period as usize - m
    }
}
