//! DemandLab CLI — forecast demand and plan reorders from a sales export.
//!
//! Commands:
//! - `run` — load transactions, forecast every item, compute reorder
//!   policies, simulate stockout risk, write the output tables
//! - `config` — print the default pipeline configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use demandlab_runner::{
    load_daily_demand, logging, run_pipeline, write_outputs, LoadedDemand, PipelineConfig,
    PipelineOutput, RunMetadata,
};

#[derive(Parser)]
#[command(
    name = "demandlab",
    about = "DemandLab CLI — demand forecasting and reorder policy simulation"
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a transactions CSV.
    Run(RunArgs),
    /// Print the default configuration as TOML.
    Config,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the transactions CSV.
    #[arg(long)]
    input: PathBuf,

    /// Output directory for tables and metadata.
    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// Path to a TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Forecast horizon in days.
    #[arg(long)]
    horizon: Option<usize>,

    /// Maximum backtest window in days.
    #[arg(long)]
    backtest: Option<usize>,

    /// Replenishment lead time in days.
    #[arg(long, allow_negative_numbers = true)]
    lead_time: Option<i64>,

    /// Review period in days.
    #[arg(long, allow_negative_numbers = true)]
    review_period: Option<i64>,

    /// Target service level, strictly between 0 and 1.
    #[arg(long)]
    service_level: Option<f64>,

    /// Monte Carlo runs per item.
    #[arg(long)]
    sim_runs: Option<usize>,

    /// Master random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Process items one at a time instead of in parallel.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Worker threads (0 = one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// How many items to list in the risk summary.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::Config => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(v) = args.horizon {
        config.forecast.horizon_days = v;
    }
    if let Some(v) = args.backtest {
        config.forecast.backtest_days = v;
    }
    if let Some(v) = args.lead_time {
        config.inventory.lead_time_days = v;
    }
    if let Some(v) = args.review_period {
        config.inventory.review_period_days = v;
    }
    if let Some(v) = args.service_level {
        config.inventory.service_level = v;
    }
    if let Some(v) = args.sim_runs {
        config.inventory.simulation_runs = v;
    }
    if let Some(v) = args.seed {
        config.inventory.random_seed = v;
    }
    if let Some(v) = args.threads {
        config.execution.threads = v;
    }
    if args.sequential {
        config.execution.parallel = false;
    }
    Ok(config)
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    config.validate().context("invalid configuration")?;
    tracing::info!(
        input = %args.input.display(),
        horizon = config.forecast.horizon_days,
        runs = config.inventory.simulation_runs,
        seed = config.inventory.random_seed,
        "starting run"
    );

    let data = load_daily_demand(&args.input, &config.clean)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let output = run_pipeline(&data.daily, &config)?;

    let meta = RunMetadata::new(&config, &data, &output)?;
    write_outputs(&args.out, &data, &output, &meta)?;

    print_summary(&data, &output, &args.out, args.top);
    Ok(())
}

fn print_summary(data: &LoadedDemand, output: &PipelineOutput, out_dir: &Path, top: usize) {
    println!();
    println!("=== DemandLab Run ===");
    println!("Outputs:        {}", out_dir.display());
    println!("Transactions:   {}", data.n_txn_rows);
    match (data.daily.start_date(), data.daily.end_date()) {
        (Some(start), Some(end)) => {
            println!("Days covered:   {} ({start} to {end})", data.daily.n_days())
        }
        _ => println!("Days covered:   0"),
    }
    println!("Items:          {}", data.daily.n_items());
    println!("Failed items:   {}", output.failures.len());
    for warning in &output.params.clamped {
        println!("WARNING: {warning}");
    }

    if output.summaries.is_empty() {
        return;
    }
    println!();
    println!("--- Highest stockout risk ---");
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10}",
        "item", "stockout%", "rop", "S", "unmet"
    );
    for s in output.summaries.iter().take(top) {
        let policy = output.policies.iter().find(|p| p.item == s.item);
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.item,
            s.avg_stockout_day_rate,
            policy.map_or(f64::NAN, |p| p.reorder_point),
            policy.map_or(f64::NAN, |p| p.order_up_to),
            s.avg_unmet_demand_units,
        );
    }
    for f in &output.failures {
        println!("FAILED: {} ({}): {}", f.item, f.stage, f.message);
    }
}
