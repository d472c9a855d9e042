//! Batch pipeline — backtest, select, forecast, plan, and simulate every item.
//!
//! Items are independent. Each one runs the full chain on its own and either
//! yields an `ItemResult` or an `ItemFailure`; a failing item never aborts the
//! batch. With `execution.parallel` the items fan out over a private rayon
//! pool. Collection preserves item order and every item draws from its own
//! seeded RNG, so parallel and sequential runs produce identical output.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

use demandlab_core::backtest::backtest_item;
use demandlab_core::config::{ForecastConfig, InventoryParams};
use demandlab_core::domain::{
    ForecastPoint, ModelScore, ModelSelection, ReorderPolicy, SimulationSummary,
};
use demandlab_core::forecast::{forecast_with_selection, quantities};
use demandlab_core::models::ModelBank;
use demandlab_core::policy::{compute_policy, rank_policies};
use demandlab_core::provider::SeriesProvider;
use demandlab_core::selection::select_model;
use demandlab_core::simulation::{rank_summaries, InventorySimulator};

use crate::config::{PipelineConfig, PipelineConfigError};

/// Errors that stop the whole batch. Per-item problems are `ItemFailure`s.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] PipelineConfigError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

// ─── Per-item results ────────────────────────────────────────────────

/// Pipeline stage an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Forecast,
    Policy,
    Simulation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Forecast => "forecast",
            Stage::Policy => "policy",
            Stage::Simulation => "simulation",
        };
        f.write_str(name)
    }
}

/// An item that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub item: String,
    pub stage: Stage,
    pub message: String,
}

impl ItemFailure {
    fn new(item: &str, stage: Stage, err: impl fmt::Display) -> Self {
        Self {
            item: item.to_string(),
            stage,
            message: err.to_string(),
        }
    }
}

/// Everything produced for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub scores: Vec<ModelScore>,
    pub selection: ModelSelection,
    pub forecast: Vec<ForecastPoint>,
    pub policy: ReorderPolicy,
    pub summary: SimulationSummary,
}

/// Collected output of a batch run.
///
/// Scores, selections, and forecasts are in item order. Policies are ranked by
/// descending reorder point, summaries by descending stockout rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub scores: Vec<ModelScore>,
    pub selections: Vec<ModelSelection>,
    pub forecasts: Vec<ForecastPoint>,
    pub policies: Vec<ReorderPolicy>,
    pub summaries: Vec<SimulationSummary>,
    pub failures: Vec<ItemFailure>,
    /// Validated inventory parameters the batch ran with.
    pub params: InventoryParams,
}

impl PipelineOutput {
    fn from_results(
        results: Vec<Result<ItemResult, ItemFailure>>,
        params: InventoryParams,
    ) -> Self {
        let mut out = Self {
            scores: Vec::new(),
            selections: Vec::new(),
            forecasts: Vec::new(),
            policies: Vec::new(),
            summaries: Vec::new(),
            failures: Vec::new(),
            params,
        };
        for result in results {
            match result {
                Ok(r) => {
                    out.scores.extend(r.scores);
                    out.selections.push(r.selection);
                    out.forecasts.extend(r.forecast);
                    out.policies.push(r.policy);
                    out.summaries.push(r.summary);
                }
                Err(failure) => out.failures.push(failure),
            }
        }
        rank_policies(&mut out.policies);
        rank_summaries(&mut out.summaries);
        out
    }

    /// Number of items that made it through every stage.
    pub fn items_ok(&self) -> usize {
        self.selections.len()
    }
}

// ─── Execution ───────────────────────────────────────────────────────

/// Shared, read-only state for one batch.
struct BatchContext<'a> {
    provider: &'a dyn SeriesProvider,
    bank: ModelBank,
    forecast: &'a ForecastConfig,
    params: &'a InventoryParams,
    simulator: InventorySimulator,
}

impl BatchContext<'_> {
    fn run_item(&self, item: &str) -> Result<ItemResult, ItemFailure> {
        let series = self
            .provider
            .series(item)
            .map_err(|e| ItemFailure::new(item, Stage::Load, e))?;

        let scores = backtest_item(&series, &self.bank, self.forecast);
        let selection = select_model(item, &scores);
        let forecast = forecast_with_selection(&series, &selection, &self.bank, self.forecast)
            .map_err(|e| ItemFailure::new(item, Stage::Forecast, e))?;

        let policy = compute_policy(&quantities(&forecast), &series, self.params)
            .map_err(|e| ItemFailure::new(item, Stage::Policy, e))?;

        let summary = self
            .simulator
            .simulate(&policy)
            .map_err(|e| ItemFailure::new(item, Stage::Simulation, e))?;

        tracing::debug!(item, model = %selection.chosen_model_id, "item complete");
        Ok(ItemResult {
            scores,
            selection,
            forecast,
            policy,
            summary,
        })
    }

    fn run_logged(&self, item: &str) -> Result<ItemResult, ItemFailure> {
        let result = self.run_item(item);
        if let Err(failure) = &result {
            tracing::warn!(
                item = %failure.item,
                stage = %failure.stage,
                message = %failure.message,
                "item failed"
            );
        }
        result
    }
}

/// Run the full pipeline over every item `provider` knows.
///
/// Configuration is validated up front; an invalid config fails before any
/// item is touched.
pub fn run_pipeline(
    provider: &dyn SeriesProvider,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let params = config.validate()?;
    for warning in &params.clamped {
        tracing::warn!(%warning, "inventory period clamped");
    }
    let items = provider.items();
    let started = Instant::now();
    tracing::info!(
        items = items.len(),
        parallel = config.execution.parallel,
        runs = params.simulation_runs,
        "pipeline started"
    );

    let ctx = BatchContext {
        provider,
        bank: ModelBank::from_config(&config.forecast),
        forecast: &config.forecast,
        params: &params,
        simulator: InventorySimulator::new(config.forecast.horizon_days, &params),
    };

    let results: Vec<Result<ItemResult, ItemFailure>> = if config.execution.parallel {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.execution.threads)
            .build()?;
        pool.install(|| items.par_iter().map(|item| ctx.run_logged(item)).collect())
    } else {
        items.iter().map(|item| ctx.run_logged(item)).collect()
    };

    let output = PipelineOutput::from_results(results, params.clone());
    tracing::info!(
        ok = output.items_ok(),
        failed = output.failures.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline finished"
    );
    Ok(output)
}
