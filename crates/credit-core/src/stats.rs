//! Statistical primitives shared by the trend engine and the loaders.
//!
//! Every function takes the already-filtered, non-missing values and returns
//! `None` when the requested statistic is undefined for that input, rather
//! than collapsing to zero.

use statrs::statistics::Statistics;

/// Drop missing and non-finite entries.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

/// Treat NaN and infinities as missing.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Arithmetic mean. Undefined for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    finite(Some(data.mean()))
}

/// Sample standard deviation (ddof = 1). Undefined below two points.
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    finite(Some(data.std_dev()))
}

/// Ordinary least squares slope of `y` regressed on `x`.
///
/// Undefined with fewer than two points or when every `x` is identical.
pub fn ols_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx.abs() < f64::EPSILON {
        return None;
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    finite(Some(sxy / sxx))
}
