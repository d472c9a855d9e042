//! Export — CSV tables and run metadata JSON.
//!
//! One output directory per run:
//! - `daily_item_demand.csv` — zero-filled daily table
//! - `backtest_scores.csv`, `item_model_selection.csv`
//! - `forecast_next_{h}d.csv`
//! - `reorder_policy.csv`, `simulation_summary.csv` (ranked)
//! - `item_failures.csv` — only when some items failed
//! - `run_metadata.json` — parameters and dataset counts
//!
//! Undefined metrics are written as empty cells.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use demandlab_core::domain::{
    ForecastPoint, ModelScore, ModelSelection, ReorderPolicy, SimulationSummary,
};

use crate::config::PipelineConfig;
use crate::data_loader::{DailyRow, LoadedDemand};
use crate::pipeline::{ItemFailure, PipelineOutput};

/// Current schema version of `run_metadata.json`.
pub const SCHEMA_VERSION: u32 = 1;

// ─── Run metadata ───────────────────────────────────────────────────

/// Parameters and dataset counts of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub schema_version: u32,
    /// Content hash of the effective configuration.
    pub run_id: String,
    pub horizon_days: usize,
    pub backtest_days: usize,
    pub lead_time_days: u32,
    pub review_period_days: u32,
    pub service_level: f64,
    pub simulation_runs: usize,
    pub random_seed: u64,
    pub n_txn_rows: usize,
    pub n_days: usize,
    pub n_items: usize,
    pub n_failed_items: usize,
}

impl RunMetadata {
    pub fn new(
        config: &PipelineConfig,
        data: &LoadedDemand,
        output: &PipelineOutput,
    ) -> Result<Self> {
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            run_id: config.run_id().context("failed to hash configuration")?,
            horizon_days: config.forecast.horizon_days,
            backtest_days: config.forecast.backtest_days,
            lead_time_days: output.params.lead_time_days,
            review_period_days: output.params.review_period_days,
            service_level: output.params.service_level,
            simulation_runs: output.params.simulation_runs,
            random_seed: output.params.random_seed,
            n_txn_rows: data.n_txn_rows,
            n_days: data.daily.n_days(),
            n_items: data.daily.n_items(),
            n_failed_items: output.failures.len(),
        })
    }
}

/// Serialize metadata to pretty JSON.
pub fn export_metadata_json(meta: &RunMetadata) -> Result<String> {
    serde_json::to_string_pretty(meta).context("failed to serialize run metadata to JSON")
}

/// Load `run_metadata.json` from an output directory, rejecting unknown
/// schema versions.
pub fn load_metadata(dir: &Path) -> Result<RunMetadata> {
    let path = dir.join("run_metadata.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let meta: RunMetadata =
        serde_json::from_str(&json).context("failed to deserialize run metadata")?;
    if meta.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            meta.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(meta)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Format a number, leaving NaN as an empty cell.
fn num(v: f64, precision: usize) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{v:.precision$}")
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: date, item, demand_qty, revenue, txn_count
pub fn export_daily_csv(rows: &[DailyRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "item", "demand_qty", "revenue", "txn_count"])?;
    for r in rows {
        wtr.write_record([
            &r.date.to_string(),
            &r.item,
            &num(r.demand_qty, 2),
            &num(r.revenue, 2),
            &r.txn_count.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Columns: item, model, mae, rmse, mape
pub fn export_scores_csv(scores: &[ModelScore]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["item", "model", "mae", "rmse", "mape"])?;
    for s in scores {
        wtr.write_record([
            &s.item,
            &s.model_id,
            &num(s.mae, 4),
            &num(s.rmse, 4),
            &num(s.mape, 4),
        ])?;
    }
    finish(wtr)
}

/// Columns: item, chosen_model
pub fn export_selection_csv(selections: &[ModelSelection]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["item", "chosen_model"])?;
    for s in selections {
        wtr.write_record([&s.item, &s.chosen_model_id])?;
    }
    finish(wtr)
}

/// Columns: item, date, forecast_qty
pub fn export_forecast_csv(points: &[ForecastPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["item", "date", "forecast_qty"])?;
    for p in points {
        wtr.write_record([&p.item, &p.date.to_string(), &num(p.forecast_qty, 4)])?;
    }
    finish(wtr)
}

/// Columns: item, mu, sigma, service_level, z, lead_time_days,
/// review_period_days, safety_stock, reorder_point, order_up_to
pub fn export_policy_csv(policies: &[ReorderPolicy]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "item",
        "mu",
        "sigma",
        "service_level",
        "z",
        "lead_time_days",
        "review_period_days",
        "safety_stock",
        "reorder_point",
        "order_up_to",
    ])?;
    for p in policies {
        wtr.write_record([
            &p.item,
            &num(p.mu, 4),
            &num(p.sigma, 4),
            &num(p.service_level, 4),
            &num(p.z, 6),
            &p.lead_time_days.to_string(),
            &p.review_period_days.to_string(),
            &num(p.safety_stock, 4),
            &num(p.reorder_point, 4),
            &num(p.order_up_to, 4),
        ])?;
    }
    finish(wtr)
}

/// Columns: item, horizon_days, runs, avg_stockout_day_rate,
/// avg_onhand_units, avg_unmet_demand_units
pub fn export_simulation_csv(summaries: &[SimulationSummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "item",
        "horizon_days",
        "runs",
        "avg_stockout_day_rate",
        "avg_onhand_units",
        "avg_unmet_demand_units",
    ])?;
    for s in summaries {
        wtr.write_record([
            &s.item,
            &s.horizon_days.to_string(),
            &s.runs.to_string(),
            &num(s.avg_stockout_day_rate, 4),
            &num(s.avg_onhand_units, 4),
            &num(s.avg_unmet_demand_units, 4),
        ])?;
    }
    finish(wtr)
}

/// Columns: item, stage, message
pub fn export_failures_csv(failures: &[ItemFailure]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["item", "stage", "message"])?;
    for f in failures {
        wtr.write_record([&f.item, &f.stage.to_string(), &f.message])?;
    }
    finish(wtr)
}

// ─── Output directory ───────────────────────────────────────────────

/// Name of the forecast table for a given horizon.
pub fn forecast_file_name(horizon_days: usize) -> String {
    format!("forecast_next_{horizon_days}d.csv")
}

fn write_file(dir: &Path, name: &str, content: &str, written: &mut Vec<PathBuf>) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);
    Ok(())
}

/// Write every output table and the metadata file into `out_dir`.
///
/// Returns the paths written, in write order.
pub fn write_outputs(
    out_dir: &Path,
    data: &LoadedDemand,
    output: &PipelineOutput,
    meta: &RunMetadata,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

    let mut written = Vec::new();
    let w = &mut written;
    write_file(out_dir, "daily_item_demand.csv", &export_daily_csv(&data.daily.rows())?, w)?;
    write_file(out_dir, "backtest_scores.csv", &export_scores_csv(&output.scores)?, w)?;
    write_file(
        out_dir,
        "item_model_selection.csv",
        &export_selection_csv(&output.selections)?,
        w,
    )?;
    write_file(
        out_dir,
        &forecast_file_name(meta.horizon_days),
        &export_forecast_csv(&output.forecasts)?,
        w,
    )?;
    write_file(out_dir, "reorder_policy.csv", &export_policy_csv(&output.policies)?, w)?;
    write_file(
        out_dir,
        "simulation_summary.csv",
        &export_simulation_csv(&output.summaries)?,
        w,
    )?;
    if !output.failures.is_empty() {
        write_file(out_dir, "item_failures.csv", &export_failures_csv(&output.failures)?, w)?;
    }
    write_file(out_dir, "run_metadata.json", &export_metadata_json(meta)?, w)?;

    tracing::info!(dir = %out_dir.display(), files = written.len(), "outputs written");
    Ok(written)
}
