//! Forecast model bank.
//!
//! Every strategy implements `ForecastModel`: history in, `horizon` values out.
//! Models are registered in a `ModelBank` under their identifier string, so the
//! rest of the crate resolves models by id instead of matching on names.

pub mod bank;
pub mod ewma;
pub mod moving_average;
pub mod seasonal_naive;

pub use bank::{ModelBank, ModelError};
pub use ewma::Ewma;
pub use moving_average::MovingAverage;
pub use seasonal_naive::SeasonalNaive;

/// Window of the fallback moving-average model.
pub const DEFAULT_MA_WINDOW: usize = 7;

/// Identifier of the fallback model used when no backtest score is usable.
pub const DEFAULT_MODEL_ID: &str = "moving_average_7d";

/// A forecasting heuristic.
///
/// Implementations must be pure: the same history and horizon always produce
/// the same vector of exactly `horizon` values. Empty history is valid input.
pub trait ForecastModel: Send + Sync + std::fmt::Debug {
    /// Identifier the model is registered under (e.g., "moving_average_7d").
    fn id(&self) -> &str;

    /// Forecast `horizon` future values from `history`.
    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_id_matches_default_window() {
        assert_eq!(MovingAverage::new(DEFAULT_MA_WINDOW).id(), DEFAULT_MODEL_ID);
    }

    #[test]
    fn every_model_honours_horizon_on_empty_history() {
        let models: Vec<Box<dyn ForecastModel>> = vec![
            Box::new(SeasonalNaive::new(7)),
            Box::new(MovingAverage::new(7)),
            Box::new(Ewma::new(0.3)),
        ];
        for m in &models {
            let fc = m.forecast(&[], 5);
            assert_eq!(fc, vec![0.0; 5], "{}", m.id());
            assert!(m.forecast(&[1.0, 2.0], 0).is_empty(), "{}", m.id());
        }
    }
}
