//! Model registry — the set of forecasting heuristics evaluated per item.
//!
//! Models are stored in registration order, which is also the evaluation
//! order the backtester uses and the tie-break order the selector respects.

use super::{
    Ewma, ForecastModel, MovingAverage, SeasonalNaive, DEFAULT_MA_WINDOW, DEFAULT_MODEL_ID,
};
use crate::config::ForecastConfig;

/// Errors from registering or resolving models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown forecast model: {0}")]
    UnknownModel(String),
    #[error("forecast model already registered: {0}")]
    DuplicateModel(String),
}

/// Registry of forecast models keyed by identifier.
#[derive(Debug)]
pub struct ModelBank {
    models: Vec<Box<dyn ForecastModel>>,
    fallback: MovingAverage,
}

impl ModelBank {
    /// An empty bank. Only the fallback model resolves.
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            fallback: MovingAverage::new(DEFAULT_MA_WINDOW),
        }
    }

    /// The standard bank: seasonal naive, moving average, EWMA (in that order).
    ///
    /// The three ids carry distinct prefixes, so no duplicate check applies.
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            models: vec![
                Box::new(SeasonalNaive::new(config.seasonal_period)),
                Box::new(MovingAverage::new(config.ma_window)),
                Box::new(Ewma::new(config.ewma_alpha)),
            ],
            fallback: MovingAverage::new(DEFAULT_MA_WINDOW),
        }
    }

    /// Register a model under its own id.
    pub fn register(&mut self, model: Box<dyn ForecastModel>) -> Result<(), ModelError> {
        if self.get(model.id()).is_some() {
            return Err(ModelError::DuplicateModel(model.id().to_string()));
        }
        self.models.push(model);
        Ok(())
    }

    /// Look up a registered model.
    pub fn get(&self, id: &str) -> Option<&dyn ForecastModel> {
        self.models
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.as_ref())
    }

    /// Look up a registered model, falling back to the built-in default model
    /// when `id` is `DEFAULT_MODEL_ID`.
    pub fn resolve(&self, id: &str) -> Result<&dyn ForecastModel, ModelError> {
        if let Some(model) = self.get(id) {
            return Ok(model);
        }
        if id == DEFAULT_MODEL_ID {
            return Ok(&self.fallback);
        }
        Err(ModelError::UnknownModel(id.to_string()))
    }

    /// Registered models in evaluation order.
    pub fn models(&self) -> impl Iterator<Item = &dyn ForecastModel> {
        self.models.iter().map(|m| m.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelBank {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Constant(f64);

    impl ForecastModel for Constant {
        fn id(&self) -> &str {
            "constant"
        }
        fn forecast(&self, _history: &[f64], horizon: usize) -> Vec<f64> {
            vec![self.0; horizon]
        }
    }

    #[test]
    fn standard_bank_order() {
        let bank = ModelBank::default();
        assert_eq!(
            bank.ids(),
            vec!["seasonal_naive_weekly", "moving_average_7d", "ewma_alpha_0.3"]
        );
    }

    #[test]
    fn configured_bank_has_distinct_ids() {
        let cfg = ForecastConfig {
            seasonal_period: 3,
            ma_window: 3,
            ewma_alpha: 1.0,
            ..Default::default()
        };
        let bank = ModelBank::from_config(&cfg);
        let mut ids = bank.ids();
        assert_eq!(ids.len(), 3);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        for id in bank.ids() {
            assert_eq!(bank.resolve(id).unwrap().id(), id);
        }
    }

    #[test]
    fn custom_model_plugs_in() {
        let mut bank = ModelBank::default();
        bank.register(Box::new(Constant(5.0))).unwrap();
        assert_eq!(bank.len(), 4);
        let m = bank.resolve("constant").unwrap();
        assert_eq!(m.forecast(&[], 2), vec![5.0, 5.0]);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut bank = ModelBank::new();
        bank.register(Box::new(Constant(1.0))).unwrap();
        assert_eq!(
            bank.register(Box::new(Constant(2.0))),
            Err(ModelError::DuplicateModel("constant".into()))
        );
    }

    #[test]
    fn fallback_resolves_even_when_not_registered() {
        let cfg = ForecastConfig {
            ma_window: 14,
            ..Default::default()
        };
        let bank = ModelBank::from_config(&cfg);
        assert!(bank.get(DEFAULT_MODEL_ID).is_none());
        let m = bank.resolve(DEFAULT_MODEL_ID).unwrap();
        assert_eq!(m.id(), DEFAULT_MODEL_ID);
    }

    #[test]
    fn unknown_model_errors() {
        let bank = ModelBank::default();
        assert_eq!(
            bank.resolve("prophet").unwrap_err(),
            ModelError::UnknownModel("prophet".into())
        );
    }
}
