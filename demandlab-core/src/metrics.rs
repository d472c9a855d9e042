//! Forecast accuracy metrics — pure functions over paired actual/predicted
//! slices.
//!
//! All three return NaN when there is nothing to score. MAPE only counts
//! points with a strictly positive actual.

use serde::{Deserialize, Serialize};

/// MAE / RMSE / MAPE for one forecast against one held-out window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

impl AccuracyMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            mae: mae(actual, predicted),
            rmse: rmse(actual, predicted),
            mape: mape(actual, predicted),
        }
    }
}

/// Mean absolute error over the common prefix of both slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()))
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2))).sqrt()
}

/// Mean absolute percentage error (×100) over points with `actual > 0`.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    let ratios = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a > 0.0)
        .map(|(a, p)| ((a - p) / a).abs());
    mean_of(ratios) * 100.0
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}
