use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2, Axis};

/// Project `data` (samples × features) onto its leading principal axes.
///
/// Columns are mean-centred; components come from the eigen-decomposition
/// of the covariance matrix, ordered by decreasing variance. Each axis is
/// oriented so that its largest-magnitude loading is positive. When there
/// are fewer features than `n_components`, the missing components are zero.
pub fn principal_components(data: ArrayView2<'_, f64>, n_components: usize) -> Array2<f64> {
    let (n, d) = data.dim();
    let mut out = Array2::<f64>::zeros((n, n_components));
    if n == 0 || d == 0 || n_components == 0 {
        return out;
    }

    let Some(means) = data.mean_axis(Axis(0)) else {
        return out;
    };
    let centred = &data - &means.insert_axis(Axis(0));

    let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
    let cov = centred.t().dot(&centred) / denom;
    let eigen = SymmetricEigen::new(DMatrix::from_fn(d, d, |i, j| cov[[i, j]]));

    let mut order: Vec<(usize, f64)> = eigen.eigenvalues.iter().copied().enumerate().collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    for (k, (idx, _)) in order.into_iter().take(n_components).enumerate() {
        let axis = eigen.eigenvectors.column(idx);
        let pivot = axis
            .iter()
            .copied()
            .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
            .unwrap_or(0.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

        for (cell, row) in out
            .column_mut(k)
            .iter_mut()
            .zip(centred.axis_iter(Axis(0)))
        {
            let dot: f64 = row.iter().zip(axis.iter()).map(|(x, v)| x * v).sum();
            *cell = sign * dot;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn first_component_follows_dominant_axis() {
        let data = array![[0.0, 0.0], [1.0, 0.1], [2.0, -0.1], [3.0, 0.0]];
        let proj = principal_components(data.view(), 2);

        assert_eq!(proj.dim(), (4, 2));
        let first = proj.column(0);
        assert!(first[3] > first[0]);
        assert_abs_diff_eq!(first.sum(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first[3] - first[0], 3.0, epsilon = 0.05);
    }

    #[test]
    fn pads_when_features_are_fewer_than_components() {
        let data = array![[1.0], [2.0], [4.0]];
        let proj = principal_components(data.view(), 2);
        assert_eq!(proj.dim(), (3, 2));
        assert!(proj.column(1).iter().all(|&v| v == 0.0));
        assert_abs_diff_eq!(proj[[0, 0]], 1.0 - 7.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_input_gives_empty_projection() {
        let data = Array2::<f64>::zeros((0, 3));
        assert_eq!(principal_components(data.view(), 2).dim(), (0, 2));
    }
}
