//! Rebalab Runner: backtest orchestration on top of `rebalab-core`.
//!
//! This crate provides:
//! - TOML configuration with a content-addressed run id
//! - Data loading from CSV / Parquet files or a tagged synthetic generator
//! - Single runs and parallel strategy comparisons over one shared price table
//! - JSON / CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, DataConfig, RunId, SyntheticConfig};
pub use data_loader::{generate_synthetic_prices, load_prices, DataSource, LoadError, LoadedData};
pub use export::{export_json, export_returns_csv, import_json, load_artifacts, save_artifacts};
pub use runner::{
    run_batch, run_comparison, run_single_backtest, run_with_data, BatchOutcome, RunError,
};
