//! Small descriptive-statistics helpers shared by the extractors.
//!
//! Moments are population (biased) estimates. Functions that can be
//! undefined return `NaN`; callers decide how to recover.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (`ddof = 0`).
pub fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    central_moment(values, m, 2)
}

/// Sample standard deviation (`ddof = 1`), NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

fn central_moment(values: &[f64], mean: f64, order: i32) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().map(|v| (v - mean).powi(order)).sum::<f64>() / values.len() as f64
}

/// True when the second moment is indistinguishable from zero relative to the mean.
fn is_degenerate(m2: f64, mean: f64) -> bool {
    m2 <= (1e-15 * mean).powi(2)
}

/// Biased sample skewness `m3 / m2^1.5`; NaN for constant input.
pub fn skewness(values: &[f64]) -> f64 {
    let m = mean(values);
    let m2 = central_moment(values, m, 2);
    if values.is_empty() || is_degenerate(m2, m) {
        return f64::NAN;
    }
    central_moment(values, m, 3) / m2.powf(1.5)
}

/// Biased Fisher (excess) kurtosis `m4 / m2² − 3`; NaN for constant input.
pub fn kurtosis(values: &[f64]) -> f64 {
    let m = mean(values);
    let m2 = central_moment(values, m, 2);
    if values.is_empty() || is_degenerate(m2, m) {
        return f64::NAN;
    }
    central_moment(values, m, 4) / (m2 * m2) - 3.0
}

/// Shannon entropy (natural log) of a histogram normalized to unit mass.
pub fn entropy(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return f64::NAN;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.ln()
        })
        .sum()
}

/// Replace an undefined statistic by zero.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moments_of_symmetric_data() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&v), 3.0);
        assert_eq!(median(&v), 3.0);
        assert!((variance(&v) - 2.0).abs() < 1e-12);
        assert!(skewness(&v).abs() < 1e-12);
        // Uniform-ish 5 points: m4 / m2^2 - 3 = 6.8 / 4 - 3
        assert!((kurtosis(&v) - (6.8 / 4.0 - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn constant_input_is_undefined() {
        let v = [7.0; 16];
        assert!(skewness(&v).is_nan());
        assert!(kurtosis(&v).is_nan());
        assert_eq!(finite_or_zero(skewness(&v)), 0.0);
    }

    #[test]
    fn entropy_of_two_equal_bins_is_ln2() {
        let e = entropy(&[5, 0, 5]);
        assert!((e - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn median_even_length() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
