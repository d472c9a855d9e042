//! Backtester — scores every bank model on a held-out trailing window.
//!
//! The series is split into train and test; each model forecasts the test
//! length from train only, and the forecast is scored against the held-out
//! actuals. Series with two or fewer points cannot be split meaningfully and
//! yield a single placeholder row with undefined metrics.

use crate::config::ForecastConfig;
use crate::domain::{DemandSeries, ModelScore};
use crate::metrics::AccuracyMetrics;
use crate::models::{ModelBank, DEFAULT_MODEL_ID};

/// Series at or below this length are not backtested.
pub const MIN_BACKTEST_POINTS: usize = 2;

/// Length of the held-out test window for a series of `n` points.
///
/// Long series (n > 10) hold out a quarter of the history; short ones hold out
/// everything but the first point. Both are capped by `backtest_days` and never
/// go below one.
pub fn holdout_len(n: usize, backtest_days: usize) -> usize {
    let candidate = if n > 10 {
        (n / 4).max(1)
    } else {
        n.saturating_sub(1).max(1)
    };
    backtest_days.min(candidate)
}

/// Train/test split of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<'a> {
    pub train: &'a [f64],
    pub test: &'a [f64],
}

/// Split `history` into train and trailing test windows.
pub fn split(history: &[f64], backtest_days: usize) -> Split<'_> {
    let test_len = holdout_len(history.len(), backtest_days).min(history.len());
    let (train, test) = history.split_at(history.len() - test_len);
    Split { train, test }
}

/// Score every model in `bank` on `series`.
///
/// Returns one row per model in evaluation order, or a single placeholder row
/// for series with `MIN_BACKTEST_POINTS` points or fewer.
pub fn backtest_item(
    series: &DemandSeries,
    bank: &ModelBank,
    config: &ForecastConfig,
) -> Vec<ModelScore> {
    let item = series.item();
    if series.len() <= MIN_BACKTEST_POINTS {
        tracing::debug!(item, points = series.len(), "series too short to backtest");
        return vec![ModelScore::placeholder(item, DEFAULT_MODEL_ID)];
    }

    let Split { train, test } = split(series.quantities(), config.backtest_days);
    bank.models()
        .map(|model| {
            let predicted = model.forecast(train, test.len());
            let metrics = AccuracyMetrics::compute(test, &predicted);
            ModelScore {
                item: item.to_string(),
                model_id: model.id().to_string(),
                mae: metrics.mae,
                rmse: metrics.rmse,
                mape: metrics.mape,
            }
        })
        .collect()
}
