//! Forecaster — re-runs the selected model on the full history.

use crate::config::ForecastConfig;
use crate::domain::{DemandSeries, ForecastPoint, ModelSelection};
use crate::models::{ForecastModel, ModelBank, ModelError};

/// Forecast `horizon` days after the end of `series` with `model`.
///
/// Values are clipped to be non-negative. The first point is dated the day
/// after the last observation.
pub fn forecast_item(
    series: &DemandSeries,
    model: &dyn ForecastModel,
    horizon: usize,
) -> Vec<ForecastPoint> {
    let start = series.next_date();
    model
        .forecast(series.quantities(), horizon)
        .into_iter()
        .take(horizon)
        .enumerate()
        .map(|(i, qty)| ForecastPoint {
            item: series.item().to_string(),
            date: start + chrono::Duration::days(i as i64),
            forecast_qty: qty.max(0.0),
        })
        .collect()
}

/// Resolve `selection` in `bank` and forecast `config.horizon_days`.
pub fn forecast_with_selection(
    series: &DemandSeries,
    selection: &ModelSelection,
    bank: &ModelBank,
    config: &ForecastConfig,
) -> Result<Vec<ForecastPoint>, ModelError> {
    let model = bank.resolve(&selection.chosen_model_id)?;
    Ok(forecast_item(series, model, config.horizon_days))
}

/// Forecast quantities only, in date order.
pub fn quantities(points: &[ForecastPoint]) -> Vec<f64> {
    points.iter().map(|p| p.forecast_qty).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovingAverage, DEFAULT_MODEL_ID};
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct Declining;

    impl ForecastModel for Declining {
        fn id(&self) -> &str {
            "declining"
        }
        fn forecast(&self, _history: &[f64], horizon: usize) -> Vec<f64> {
            (0..horizon).map(|i| 2.0 - i as f64).collect()
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn dates_start_after_history() {
        let s = DemandSeries::new("latte", d(2024, 2, 27), vec![1.0, 2.0, 3.0]).unwrap();
        let fc = forecast_item(&s, &MovingAverage::new(7), 3);
        let dates: Vec<NaiveDate> = fc.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 3, 1), d(2024, 3, 2), d(2024, 3, 3)]);
        assert!(fc.iter().all(|p| p.forecast_qty == 2.0));
    }

    #[test]
    fn negative_values_clip_to_zero() {
        let s = DemandSeries::new("latte", d(2024, 1, 1), vec![1.0]).unwrap();
        let fc = forecast_item(&s, &Declining, 5);
        assert_eq!(quantities(&fc), vec![2.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_history_forecasts_zero_from_start_date() {
        let s = DemandSeries::empty("latte", d(2024, 1, 1));
        let fc = forecast_item(&s, &MovingAverage::new(7), 2);
        assert_eq!(fc[0].date, d(2024, 1, 1));
        assert_eq!(quantities(&fc), vec![0.0, 0.0]);
    }

    #[test]
    fn uses_full_history_not_train_split() {
        // Train split would be all zeros; the full trailing week averages to 10.
        let mut values = vec![0.0; 9];
        values.push(70.0);
        let s = DemandSeries::new("latte", d(2024, 1, 1), values).unwrap();
        let sel = ModelSelection {
            item: "latte".into(),
            chosen_model_id: DEFAULT_MODEL_ID.into(),
        };
        let cfg = ForecastConfig {
            horizon_days: 4,
            ..Default::default()
        };
        let fc = forecast_with_selection(&s, &sel, &ModelBank::default(), &cfg).unwrap();
        assert_eq!(fc.len(), 4);
        assert!(fc.iter().all(|p| (p.forecast_qty - 10.0).abs() < 1e-12));
    }

    #[test]
    fn unknown_selection_is_an_error() {
        let s = DemandSeries::new("latte", d(2024, 1, 1), vec![1.0]).unwrap();
        let sel = ModelSelection {
            item: "latte".into(),
            chosen_model_id: "prophet".into(),
        };
        let bank = ModelBank::default();
        let err = forecast_with_selection(&s, &sel, &bank, &ForecastConfig::default()).unwrap_err();
        assert_eq!(err, ModelError::UnknownModel("prophet".into()));
    }
}
