//! DemandLab Core — demand forecasting and inventory policy engine.
//!
//! This crate holds everything that has algorithmic content and no I/O:
//! - Domain records (daily series, scores, selections, forecasts, policies, summaries)
//! - Forecast model bank (seasonal naive, moving average, EWMA) behind a trait
//! - Backtester and minimum-MAE model selector
//! - Forecaster over the full history
//! - Reorder point / order-up-to policy calculator
//! - Monte Carlo inventory simulator with a deterministic RNG hierarchy
//!
//! Ingestion, batching, and export live in `demandlab-runner`.

pub mod backtest;
pub mod config;
pub mod domain;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod provider;
pub mod rng;
pub mod selection;
pub mod simulation;
pub mod stats;

pub use config::{ConfigError, ForecastConfig, InventoryConfig, InventoryParams};
pub use domain::{
    DemandSeries, ForecastPoint, ModelScore, ModelSelection, ReorderPolicy, SeriesError,
    SimulationSummary,
};
pub use models::{ForecastModel, ModelBank, ModelError};
pub use policy::PolicyError;
pub use provider::{SeriesProvider, VecSeriesProvider};
pub use simulation::{InventorySimulator, SimulationError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: records and engines can cross worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Records
        require_send::<DemandSeries>();
        require_sync::<DemandSeries>();
        require_send::<ModelScore>();
        require_sync::<ModelScore>();
        require_send::<ModelSelection>();
        require_sync::<ModelSelection>();
        require_send::<ForecastPoint>();
        require_sync::<ForecastPoint>();
        require_send::<ReorderPolicy>();
        require_sync::<ReorderPolicy>();
        require_send::<SimulationSummary>();
        require_sync::<SimulationSummary>();

        // Config
        require_send::<ForecastConfig>();
        require_sync::<ForecastConfig>();
        require_send::<InventoryParams>();
        require_sync::<InventoryParams>();

        // Engines
        require_send::<ModelBank>();
        require_sync::<ModelBank>();
        require_send::<InventorySimulator>();
        require_sync::<InventorySimulator>();
        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
        require_send::<VecSeriesProvider>();
        require_sync::<VecSeriesProvider>();

        // Errors
        require_send::<ConfigError>();
        require_sync::<ConfigError>();
        require_send::<ModelError>();
        require_sync::<ModelError>();
        require_send::<PolicyError>();
        require_sync::<PolicyError>();
        require_send::<SimulationError>();
        require_sync::<SimulationError>();
    }

    /// The model trait is object-safe and usable through a shared reference.
    #[test]
    fn forecast_model_is_object_safe() {
        fn _run(model: &dyn ForecastModel, history: &[f64]) -> Vec<f64> {
            model.forecast(history, 3)
        }
        let bank = ModelBank::default();
        for model in bank.models() {
            assert_eq!(_run(model, &[1.0, 2.0]).len(), 3);
        }
    }
}
