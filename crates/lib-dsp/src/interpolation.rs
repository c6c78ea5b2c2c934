//! Piecewise-linear interpolation over a non-decreasing abscissa.

use crate::error::{DspError, DspResult};

/// Interpolate `(x, y)` at each of `x_new`.
///
/// Targets below `x[0]` or above `x[last]` take the end values. Repeated
/// abscissae are allowed; the right-most of a run of equal `x` wins.
pub fn interpolate_linear(x: &[f64], y: &[f64], x_new: &[f64]) -> DspResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(DspError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    if x.windows(2).any(|w| w[1] < w[0]) {
        return Err(DspError::InterpolationFailed(
            "abscissa must be non-decreasing".into(),
        ));
    }

    Ok(x_new.iter().map(|&t| interpolate_single(x, y, t)).collect())
}

/// Interpolate a single point.
fn interpolate_single(x: &[f64], y: &[f64], target: f64) -> f64 {
    let last = x.len() - 1;
    if target.is_nan() {
        return f64::NAN;
    }
    if target <= x[0] {
        return y[0];
    }
    if target >= x[last] {
        return y[last];
    }

    // Find bracketing indices: x[lower] <= target < x[upper]
    let mut lower = 0;
    let mut upper = last;

    while upper - lower > 1 {
        let mid = (lower + upper) / 2;
        if x[mid] <= target {
            lower = mid;
        } else {
            upper = mid;
        }
    }

    let x0 = x[lower];
    let x1 = x[upper];
    if x1 == x0 {
        return y[upper];
    }
    let frac = (target - x0) / (x1 - x0);

    y[lower] + frac * (y[upper] - y[lower])
}

/// Generate `num_points` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, num_points: usize) -> Vec<f64> {
    match num_points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num_points - 1) as f64;
            (0..num_points).map(|i| start + i as f64 * step).collect()
        }
    }
}
