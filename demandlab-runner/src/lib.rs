//! DemandLab Runner — batch orchestration around `demandlab-core`.
//!
//! This crate provides:
//! - Transaction CSV loading, cleaning, and zero-filled daily aggregation
//! - The per-item pipeline with failure isolation and optional rayon fan-out
//! - TOML pipeline configuration
//! - CSV / JSON export of every output table
//! - Tracing subscriber setup

pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod pipeline;

pub use config::{CleanConfig, ExecutionConfig, PipelineConfig, PipelineConfigError};
pub use data_loader::{
    aggregate_daily, clean_transactions, load_daily_demand, read_transactions, DailyDemand,
    DailyRow, LoadError, LoadedDemand, RawTransaction, Transaction,
};
pub use export::{load_metadata, write_outputs, RunMetadata};
pub use pipeline::{run_pipeline, ItemFailure, ItemResult, PipelineError, PipelineOutput, Stage};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<CleanConfig>();
        assert_sync::<CleanConfig>();
        assert_send::<ExecutionConfig>();
        assert_sync::<ExecutionConfig>();
    }

    #[test]
    fn daily_demand_is_send_sync() {
        assert_send::<DailyDemand>();
        assert_sync::<DailyDemand>();
        assert_send::<LoadedDemand>();
        assert_sync::<LoadedDemand>();
    }

    #[test]
    fn pipeline_output_is_send_sync() {
        assert_send::<PipelineOutput>();
        assert_sync::<PipelineOutput>();
        assert_send::<ItemFailure>();
        assert_sync::<ItemFailure>();
    }

    #[test]
    fn run_metadata_is_send_sync() {
        assert_send::<RunMetadata>();
        assert_sync::<RunMetadata>();
    }
}
