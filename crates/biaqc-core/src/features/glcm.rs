//! Gray-level co-occurrence matrix texture properties.

use ndarray::Array2;

use crate::consts::GLCM_LEVELS;

/// The six co-occurrence properties, each averaged over every distance × angle pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlcmFeatures {
    pub contrast: f64,
    pub dissimilarity: f64,
    pub homogeneity: f64,
    pub energy: f64,
    pub correlation: f64,
    pub asm: f64,
}

/// Rescale a slice to 0..=255 by subtracting its minimum and scaling by the
/// resulting maximum. Each slice is contrast-normalized on its own.
pub fn rescale_to_u8(data: &Array2<f32>) -> Array2<u8> {
    let min = data
        .iter()
        .map(|&v| v as f64)
        .fold(f64::INFINITY, f64::min);
    let max = data
        .iter()
        .map(|&v| v as f64 - min)
        .fold(0.0f64, f64::max);
    if !max.is_finite() || max <= 0.0 {
        return Array2::zeros(data.dim());
    }
    data.mapv(|v| ((v as f64 - min) / max * 255.0) as u8)
}

/// Symmetric, normalized co-occurrence counts for one pixel offset.
///
/// The offset for `(distance, angle)` is
/// `(round(sin(angle)·d), round(cos(angle)·d))` in (row, col).
pub fn cooccurrence(image: &Array2<u8>, distance: usize, angle: f64) -> Array2<f64> {
    let (h, w) = image.dim();
    let d_row = (angle.sin() * distance as f64).round() as isize;
    let d_col = (angle.cos() * distance as f64).round() as isize;

    let mut counts = Array2::<f64>::zeros((GLCM_LEVELS, GLCM_LEVELS));
    let row_range = (0isize.max(-d_row), (h as isize).min(h as isize - d_row));
    let col_range = (0isize.max(-d_col), (w as isize).min(w as isize - d_col));

    for r in row_range.0..row_range.1 {
        for c in col_range.0..col_range.1 {
            let i = image[[r as usize, c as usize]] as usize;
            let j = image[[(r + d_row) as usize, (c + d_col) as usize]] as usize;
            counts[[i, j]] += 1.0;
            counts[[j, i]] += 1.0;
        }
    }

    let total = counts.sum();
    if total > 0.0 {
        counts /= total;
    }
    counts
}

/// Texture properties of one normalized co-occurrence matrix.
fn properties(p: &Array2<f64>) -> GlcmFeatures {
    let mut mean_i = 0.0;
    let mut mean_j = 0.0;
    for ((i, j), &v) in p.indexed_iter() {
        if v > 0.0 {
            mean_i += i as f64 * v;
            mean_j += j as f64 * v;
        }
    }

    let mut out = GlcmFeatures::default();
    let mut var_i = 0.0;
    let mut var_j = 0.0;
    let mut cov = 0.0;
    for ((i, j), &v) in p.indexed_iter() {
        if v == 0.0 {
            continue;
        }
        let diff = i as f64 - j as f64;
        out.contrast += v * diff * diff;
        out.dissimilarity += v * diff.abs();
        out.homogeneity += v / (1.0 + diff * diff);
        out.asm += v * v;

        let di = i as f64 - mean_i;
        let dj = j as f64 - mean_j;
        var_i += v * di * di;
        var_j += v * dj * dj;
        cov += v * di * dj;
    }
    out.energy = out.asm.sqrt();

    let (std_i, std_j) = (var_i.sqrt(), var_j.sqrt());
    out.correlation = if std_i < 1e-15 || std_j < 1e-15 {
        1.0
    } else {
        cov / (std_i * std_j)
    };
    out
}

/// Average each property over the full distance × angle grid of an 8-bit image.
pub fn glcm_features(image: &Array2<u8>, distances: &[usize], angles: &[f64]) -> GlcmFeatures {
    let mut acc = GlcmFeatures::default();
    let mut n = 0usize;
    for &d in distances {
        for &a in angles {
            let props = properties(&cooccurrence(image, d, a));
            acc.contrast += props.contrast;
            acc.dissimilarity += props.dissimilarity;
            acc.homogeneity += props.homogeneity;
            acc.energy += props.energy;
            acc.correlation += props.correlation;
            acc.asm += props.asm;
            n += 1;
        }
    }
    if n == 0 {
        return acc;
    }
    let n = n as f64;
    GlcmFeatures {
        contrast: acc.contrast / n,
        dissimilarity: acc.dissimilarity / n,
        homogeneity: acc.homogeneity / n,
        energy: acc.energy / n,
        correlation: acc.correlation / n,
        asm: acc.asm / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn cooccurrence_is_symmetric_and_normalized() {
        let img = array![[0u8, 0, 1, 1], [0, 0, 1, 1], [0, 2, 2, 2], [2, 2, 3, 3]];
        let p = cooccurrence(&img, 1, 0.0);
        assert!((p.sum() - 1.0).abs() < 1e-12);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(p[[i, j]], p[[j, i]]);
            }
        }
        // 12 horizontal pairs, each counted twice
        assert!((p[[0, 0]] - 4.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_image_has_unit_energy_and_correlation() {
        let img = Array2::<u8>::from_elem((8, 8), 42);
        let f = glcm_features(&img, &[1, 2], &[0.0, std::f64::consts::FRAC_PI_2]);
        assert!((f.energy - 1.0).abs() < 1e-12);
        assert!((f.asm - 1.0).abs() < 1e-12);
        assert_eq!(f.contrast, 0.0);
        assert_eq!(f.correlation, 1.0);
        assert!((f.homogeneity - 1.0).abs() < 1e-12);
    }
}
