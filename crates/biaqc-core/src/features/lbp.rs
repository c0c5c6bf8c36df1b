//! Rotation-invariant uniform local binary patterns.

use ndarray::Array2;

/// Uniform LBP code of every pixel.
///
/// `points` neighbours are sampled on a circle of `radius` with bilinear
/// interpolation (zero outside the image). A pattern with at most two 0/1
/// transitions codes as its number of set bits (0..=points); anything else
/// codes as `points + 1`.
pub fn uniform_lbp(data: &Array2<f32>, radius: f64, points: usize) -> Array2<u32> {
    let (h, w) = data.dim();
    let offsets: Vec<(f64, f64)> = (0..points)
        .map(|p| {
            let theta = 2.0 * std::f64::consts::PI * p as f64 / points as f64;
            (round5(-radius * theta.sin()), round5(radius * theta.cos()))
        })
        .collect();

    let mut codes = Array2::<u32>::zeros((h, w));
    let mut signs = vec![0u8; points];
    for r in 0..h {
        for c in 0..w {
            let centre = data[[r, c]] as f64;
            for (sign, &(dr, dc)) in signs.iter_mut().zip(&offsets) {
                let sample = bilinear(data, r as f64 + dr, c as f64 + dc);
                *sign = u8::from(sample - centre >= 0.0);
            }
            let transitions = signs.windows(2).filter(|pair| pair[0] != pair[1]).count();
            codes[[r, c]] = if transitions <= 2 {
                signs.iter().map(|&s| s as u32).sum()
            } else {
                points as u32 + 1
            };
        }
    }
    codes
}

/// Density-normalized histogram of uniform codes with exactly `points + 2` bins.
pub fn lbp_histogram(codes: &Array2<u32>, points: usize) -> Vec<f64> {
    let bins = points + 2;
    let mut hist = vec![0.0f64; bins];
    for &code in codes.iter() {
        hist[(code as usize).min(bins - 1)] += 1.0;
    }
    let total = codes.len() as f64;
    if total > 0.0 {
        for v in hist.iter_mut() {
            *v /= total;
        }
    }
    hist
}

fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

fn bilinear(data: &Array2<f32>, r: f64, c: f64) -> f64 {
    let min_r = r.floor();
    let min_c = c.floor();
    let dr = r - min_r;
    let dc = c - min_c;
    let pixel = |rr: f64, cc: f64| -> f64 {
        let (h, w) = data.dim();
        if rr < 0.0 || cc < 0.0 || rr >= h as f64 || cc >= w as f64 {
            0.0
        } else {
            data[[rr as usize, cc as usize]] as f64
        }
    };
    let top = (1.0 - dc) * pixel(min_r, min_c) + dc * pixel(min_r, c.ceil());
    let bottom = (1.0 - dc) * pixel(r.ceil(), min_c) + dc * pixel(r.ceil(), c.ceil());
    (1.0 - dr) * top + dr * bottom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_interior_codes_all_ones() {
        let data = Array2::<f32>::from_elem((5, 5), 10.0);
        // four axis-aligned neighbours land exactly on pixels
        let codes = uniform_lbp(&data, 1.0, 4);
        assert_eq!(codes[[2, 2]], 4);
        // top-right corner: right and up neighbours read zero → pattern 0011
        assert_eq!(codes[[0, 4]], 2);
    }

    #[test]
    fn histogram_has_fixed_width() {
        let data = Array2::<f32>::from_elem((3, 3), 1.0);
        let codes = uniform_lbp(&data, 1.0, 16);
        let hist = lbp_histogram(&codes, 16);
        assert_eq!(hist.len(), 18);
        assert!((hist.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
