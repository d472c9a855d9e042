//! Domain records for DemandLab.
//!
//! `DemandSeries` is the only input shape: one item, a contiguous daily
//! calendar, non-negative quantities. Everything else here is an output row
//! (scores, selections, forecast points, policies, simulation summaries) that
//! any reporting or storage layer can consume.
//!
//! Undefined metrics are carried as `f64::NAN`, never coerced to zero.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Item identifier alias.
pub type ItemId = String;

/// Errors raised while looking up or constructing a `DemandSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("no series for unknown item '{item}'")]
    UnknownItem { item: String },

    #[error("series for '{item}' has no points")]
    NoPoints { item: String },

    #[error("series for '{item}' is not contiguous: expected {expected}, found {found}")]
    Gap {
        item: String,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("series for '{item}' has invalid quantity {value} at index {index}")]
    InvalidQuantity {
        item: String,
        index: usize,
        value: f64,
    },
}

// ─── DemandSeries ────────────────────────────────────────────────────

/// Daily demand history for one item.
///
/// Dates are implicit: point `i` falls on `start + i` days. An empty series
/// still carries a start date so forecasts can be dated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSeries {
    item: ItemId,
    start: NaiveDate,
    quantities: Vec<f64>,
}

impl DemandSeries {
    /// Build a series from a start date and one quantity per day.
    pub fn new(
        item: impl Into<String>,
        start: NaiveDate,
        quantities: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        let item = item.into();
        if let Some((index, &value)) = quantities
            .iter()
            .enumerate()
            .find(|(_, q)| !q.is_finite() || **q < 0.0)
        {
            return Err(SeriesError::InvalidQuantity { item, index, value });
        }
        Ok(Self {
            item,
            start,
            quantities,
        })
    }

    /// An empty series anchored at `start`.
    pub fn empty(item: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            item: item.into(),
            start,
            quantities: Vec::new(),
        }
    }

    /// Build a series from `(date, quantity)` pairs that must already be
    /// sorted and gap-free.
    pub fn from_points(
        item: impl Into<String>,
        points: &[(NaiveDate, f64)],
    ) -> Result<Self, SeriesError> {
        let item = item.into();
        let Some(&(start, _)) = points.first() else {
            return Err(SeriesError::NoPoints { item });
        };

        for (i, &(date, _)) in points.iter().enumerate() {
            let expected = start + Duration::days(i as i64);
            if date != expected {
                return Err(SeriesError::Gap {
                    item,
                    expected,
                    found: date,
                });
            }
        }

        Self::new(item, start, points.iter().map(|&(_, q)| q).collect())
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Date of the point at `index`.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// Last observed date, `None` for an empty series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        if self.is_empty() {
            None
        } else {
            Some(self.date_at(self.len() - 1))
        }
    }

    /// First date after the history: where a forecast horizon begins.
    pub fn next_date(&self) -> NaiveDate {
        self.date_at(self.len())
    }

    /// The trailing `n` quantities (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.len().saturating_sub(n);
        &self.quantities[start..]
    }
}

// ─── Output records ──────────────────────────────────────────────────

/// Backtest accuracy of one model on one item's held-out window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub item: ItemId,
    pub model_id: String,
    pub mae: f64,
    pub rmse: f64,
    /// Percentage; NaN when every actual in the test window is zero.
    pub mape: f64,
}

impl ModelScore {
    /// Row emitted when the series is too short to backtest.
    pub fn placeholder(item: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            model_id: model_id.into(),
            mae: f64::NAN,
            rmse: f64::NAN,
            mape: f64::NAN,
        }
    }

    /// True when the score carries a usable MAE.
    pub fn has_signal(&self) -> bool {
        self.mae.is_finite()
    }
}

/// The model chosen for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub item: ItemId,
    pub chosen_model_id: String,
}

/// One day of forward forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub item: ItemId,
    pub date: NaiveDate,
    pub forecast_qty: f64,
}

/// Reorder point / order-up-to policy for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderPolicy {
    pub item: ItemId,
    /// Mean daily demand.
    pub mu: f64,
    /// Daily demand standard deviation, after flooring.
    pub sigma: f64,
    pub service_level: f64,
    pub z: f64,
    pub lead_time_days: u32,
    pub review_period_days: u32,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub order_up_to: f64,
}

/// Monte Carlo stockout-risk summary for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub item: ItemId,
    pub horizon_days: usize,
    pub runs: usize,
    /// Mean share of stockout days, as a percentage in [0, 100].
    pub avg_stockout_day_rate: f64,
    pub avg_onhand_units: f64,
    pub avg_unmet_demand_units: f64,
}
