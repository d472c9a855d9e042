//! Reorder policy calculator.
//!
//! Converts forecast (or recent history) demand statistics into safety stock,
//! reorder point, and order-up-to levels under a normal, day-independent
//! demand assumption:
//!
//! ```text
//! safety_stock  = z · σ · √L
//! reorder_point = μ·L + safety_stock
//! order_up_to   = μ·(L+R) + safety_stock
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::InventoryParams;
use crate::domain::{DemandSeries, ReorderPolicy};
use crate::stats::{mean, population_std};

/// Forecasts shorter than this fall back to recent history for demand stats.
pub const MIN_FORECAST_POINTS: usize = 7;

/// Trailing history window used by the fallback.
pub const HISTORY_FALLBACK_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("policy for '{item}' has non-finite {field}")]
    NonFinite { item: String, field: &'static str },
}

/// Where the demand statistics came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsSource {
    Forecast,
    History,
    Empty,
}

/// Daily demand mean and (unfloored) standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandStats {
    pub mu: f64,
    pub sigma: f64,
    pub source: StatsSource,
}

/// Estimate daily demand statistics for one item.
///
/// Uses the forecast when it has at least `MIN_FORECAST_POINTS` values,
/// otherwise the trailing `HISTORY_FALLBACK_DAYS` of history, otherwise 0/0.
pub fn demand_stats(forecast: &[f64], history: &DemandSeries) -> DemandStats {
    let (window, source) = if forecast.len() >= MIN_FORECAST_POINTS {
        (forecast, StatsSource::Forecast)
    } else {
        (history.tail(HISTORY_FALLBACK_DAYS), StatsSource::History)
    };

    match (mean(window), population_std(window)) {
        (Some(mu), Some(sigma)) => DemandStats { mu, sigma, source },
        _ => DemandStats {
            mu: 0.0,
            sigma: 0.0,
            source: StatsSource::Empty,
        },
    }
}

/// Compute the reorder policy for the item `history` belongs to.
///
/// `forecast` is the item's forward forecast quantities, `history` its full
/// daily series. Sigma is floored at `params.demand_sigma_floor`.
pub fn compute_policy(
    forecast: &[f64],
    history: &DemandSeries,
    params: &InventoryParams,
) -> Result<ReorderPolicy, PolicyError> {
    let item = history.item();
    let stats = demand_stats(forecast, history);
    let sigma = stats.sigma.max(params.demand_sigma_floor);
    let mu = stats.mu;
    let lead = f64::from(params.lead_time_days);
    let review = f64::from(params.review_period_days);

    let safety_stock = params.z * sigma * lead.sqrt();
    let reorder_point = mu * lead + safety_stock;
    let order_up_to = mu * (lead + review) + safety_stock;

    let policy = ReorderPolicy {
        item: item.to_string(),
        mu,
        sigma,
        service_level: params.service_level,
        z: params.z,
        lead_time_days: params.lead_time_days,
        review_period_days: params.review_period_days,
        safety_stock,
        reorder_point,
        order_up_to,
    };
    check_finite(&policy)?;

    tracing::debug!(
        item,
        source = ?stats.source,
        mu,
        sigma,
        reorder_point,
        order_up_to,
        "reorder policy computed"
    );
    Ok(policy)
}

fn check_finite(policy: &ReorderPolicy) -> Result<(), PolicyError> {
    let fields = [
        ("mu", policy.mu),
        ("sigma", policy.sigma),
        ("z", policy.z),
        ("safety_stock", policy.safety_stock),
        ("reorder_point", policy.reorder_point),
        ("order_up_to", policy.order_up_to),
    ];
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some(&(field, _)) => Err(PolicyError::NonFinite {
            item: policy.item.clone(),
            field,
        }),
        None => Ok(()),
    }
}

/// Sort policies by descending reorder point. Ties keep their input order.
pub fn rank_policies(policies: &mut [ReorderPolicy]) {
    policies.sort_by(|a, b| b.reorder_point.total_cmp(&a.reorder_point));
}
