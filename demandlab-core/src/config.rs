//! Forecast and inventory configuration bundles.
//!
//! Both bundles are plain serde value objects. Nothing in the core mutates
//! them: `ForecastConfig::validate` checks in place, and
//! `InventoryConfig::validate` resolves into an immutable `InventoryParams`
//! (clamped periods, precomputed z) that the policy calculator and simulator
//! consume.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::stats::inverse_normal_cdf;

/// Configuration errors. All of them are raised before any per-item work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("service_level must be strictly between 0 and 1, got {0}")]
    ServiceLevelOutOfRange(f64),

    #[error("simulation_runs must be at least 1")]
    NoSimulationRuns,

    #[error("horizon_days must be at least 1")]
    ZeroHorizon,

    #[error("backtest_days must be at least 1")]
    ZeroBacktestWindow,

    #[error("ma_window must be at least 1")]
    ZeroMaWindow,

    #[error("seasonal_period must be at least 1")]
    ZeroSeasonalPeriod,

    #[error("ewma_alpha must be in (0, 1], got {0}")]
    EwmaAlphaOutOfRange(f64),

    #[error("demand_sigma_floor must be finite and non-negative, got {0}")]
    InvalidSigmaFloor(f64),
}

// ─── Forecast configuration ──────────────────────────────────────────

/// Forecast model bank and backtest parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forward forecast length in days (default 30).
    pub horizon_days: usize,
    /// Maximum held-out backtest window in days (default 28).
    pub backtest_days: usize,
    /// Moving-average window (default 7).
    pub ma_window: usize,
    /// EWMA smoothing factor (default 0.3).
    pub ewma_alpha: f64,
    /// Seasonal-naive period (default 7, weekly).
    pub seasonal_period: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            backtest_days: 28,
            ma_window: 7,
            ewma_alpha: 0.3,
            seasonal_period: 7,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.backtest_days == 0 {
            return Err(ConfigError::ZeroBacktestWindow);
        }
        if self.ma_window == 0 {
            return Err(ConfigError::ZeroMaWindow);
        }
        if self.seasonal_period == 0 {
            return Err(ConfigError::ZeroSeasonalPeriod);
        }
        if !(self.ewma_alpha > 0.0 && self.ewma_alpha <= 1.0) {
            return Err(ConfigError::EwmaAlphaOutOfRange(self.ewma_alpha));
        }
        Ok(())
    }
}

// ─── Inventory configuration ─────────────────────────────────────────

/// Reorder policy and Monte Carlo parameters, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Replenishment lead time in days (default 3). Values below 1 are clamped.
    pub lead_time_days: i64,
    /// Review period in days (default 1). Values below 1 are clamped.
    pub review_period_days: i64,
    /// Target cycle service level, strictly inside (0, 1) (default 0.95).
    pub service_level: f64,
    /// Monte Carlo repetitions per item (default 300).
    pub simulation_runs: usize,
    /// Master seed for the simulation RNG hierarchy (default 42).
    pub random_seed: u64,
    /// Minimum daily demand sigma (default 0.25).
    pub demand_sigma_floor: f64,
    /// Starting on-hand units; anything not strictly positive means
    /// "start at the order-up-to level".
    pub initial_inventory_units: f64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            lead_time_days: 3,
            review_period_days: 1,
            service_level: 0.95,
            simulation_runs: 300,
            random_seed: 42,
            demand_sigma_floor: 0.25,
            initial_inventory_units: 0.0,
        }
    }
}

/// A period that was raised to the minimum of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampWarning {
    LeadTime { requested: i64 },
    ReviewPeriod { requested: i64 },
}

impl fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClampWarning::LeadTime { requested } => {
                write!(f, "lead_time_days={requested} clamped to 1")
            }
            ClampWarning::ReviewPeriod { requested } => {
                write!(f, "review_period_days={requested} clamped to 1")
            }
        }
    }
}

/// Validated, immutable inventory parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryParams {
    pub lead_time_days: u32,
    pub review_period_days: u32,
    pub service_level: f64,
    /// Standard-normal quantile of `service_level`.
    pub z: f64,
    pub simulation_runs: usize,
    pub random_seed: u64,
    pub demand_sigma_floor: f64,
    pub initial_inventory_units: f64,
    /// Periods that had to be clamped, for reporting back to the caller.
    pub clamped: Vec<ClampWarning>,
}

impl InventoryConfig {
    /// Check the configuration and resolve it into `InventoryParams`.
    ///
    /// Service level and run count are hard errors. Non-positive lead time or
    /// review period is clamped to 1 and recorded in `clamped`; reporting the
    /// clamp is left to the caller.
    pub fn validate(&self) -> Result<InventoryParams, ConfigError> {
        if !(self.service_level > 0.0 && self.service_level < 1.0) {
            return Err(ConfigError::ServiceLevelOutOfRange(self.service_level));
        }
        if self.simulation_runs == 0 {
            return Err(ConfigError::NoSimulationRuns);
        }
        if !self.demand_sigma_floor.is_finite() || self.demand_sigma_floor < 0.0 {
            return Err(ConfigError::InvalidSigmaFloor(self.demand_sigma_floor));
        }

        let mut clamped = Vec::new();
        let lead_time_days = clamp_period(
            self.lead_time_days,
            || ClampWarning::LeadTime {
                requested: self.lead_time_days,
            },
            &mut clamped,
        );
        let review_period_days = clamp_period(
            self.review_period_days,
            || ClampWarning::ReviewPeriod {
                requested: self.review_period_days,
            },
            &mut clamped,
        );

        Ok(InventoryParams {
            lead_time_days,
            review_period_days,
            service_level: self.service_level,
            z: inverse_normal_cdf(self.service_level),
            simulation_runs: self.simulation_runs,
            random_seed: self.random_seed,
            demand_sigma_floor: self.demand_sigma_floor,
            initial_inventory_units: if self.initial_inventory_units.is_finite() {
                self.initial_inventory_units
            } else {
                0.0
            },
            clamped,
        })
    }
}

fn clamp_period(
    days: i64,
    warning: impl FnOnce() -> ClampWarning,
    clamped: &mut Vec<ClampWarning>,
) -> u32 {
    if days < 1 {
        clamped.push(warning());
        1
    } else {
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let f = ForecastConfig::default();
        assert_eq!(f.horizon_days, 30);
        assert_eq!(f.backtest_days, 28);
        assert_eq!(f.ma_window, 7);
        assert_eq!(f.seasonal_period, 7);
        assert!((f.ewma_alpha - 0.3).abs() < 1e-12);

        let i = InventoryConfig::default();
        assert_eq!(i.lead_time_days, 3);
        assert_eq!(i.review_period_days, 1);
        assert_eq!(i.simulation_runs, 300);
        assert_eq!(i.random_seed, 42);
        assert!((i.demand_sigma_floor - 0.25).abs() < 1e-12);
    }

    #[test]
    fn service_level_bounds_are_rejected() {
        for sl in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let cfg = InventoryConfig {
                service_level: sl,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::ServiceLevelOutOfRange(_))
            ));
        }
    }

    #[test]
    fn zero_runs_rejected() {
        let cfg = InventoryConfig {
            simulation_runs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoSimulationRuns));
    }

    #[test]
    fn non_positive_periods_are_clamped() {
        let cfg = InventoryConfig {
            lead_time_days: 0,
            review_period_days: -4,
            ..Default::default()
        };
        let params = cfg.validate().unwrap();
        assert_eq!(params.lead_time_days, 1);
        assert_eq!(params.review_period_days, 1);
        assert_eq!(
            params.clamped,
            vec![
                ClampWarning::LeadTime { requested: 0 },
                ClampWarning::ReviewPeriod { requested: -4 },
            ]
        );
    }

    #[test]
    fn valid_periods_are_not_flagged() {
        let params = InventoryConfig::default().validate().unwrap();
        assert_eq!(params.lead_time_days, 3);
        assert!(params.clamped.is_empty());
        assert!((params.z - 1.644_853_6).abs() < 1e-6);
    }

    #[test]
    fn negative_sigma_floor_rejected() {
        let cfg = InventoryConfig {
            demand_sigma_floor: -0.1,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSigmaFloor(_))));
    }

    #[test]
    fn forecast_config_checks() {
        assert!(ForecastConfig::default().validate().is_ok());

        let zero_h = ForecastConfig {
            horizon_days: 0,
            ..Default::default()
        };
        assert_eq!(zero_h.validate(), Err(ConfigError::ZeroHorizon));

        let bad_alpha = ForecastConfig {
            ewma_alpha: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(ConfigError::EwmaAlphaOutOfRange(_))
        ));

        let alpha_one = ForecastConfig {
            ewma_alpha: 1.0,
            ..Default::default()
        };
        assert!(alpha_one.validate().is_ok());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: InventoryConfig = serde_json::from_str(r#"{"lead_time_days": 5}"#).unwrap();
        assert_eq!(cfg.lead_time_days, 5);
        assert_eq!(cfg.simulation_runs, 300);
    }
}
