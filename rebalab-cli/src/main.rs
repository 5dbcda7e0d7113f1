//! Rebalab CLI: run, compare, and inspect commands.
//!
//! Commands:
//! - `run`: execute one backtest from a TOML config and save its artifacts
//! - `compare`: run the main strategy plus every `[[compare]]` entry in parallel
//! - `inspect`: summarize a CSV / Parquet price file

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rebalab_core::data::load_price_table;
use rebalab_core::engine::{BacktestResult, RunWarning};
use rebalab_core::fingerprint::dataset_hash;
use rebalab_runner::runner::{run_comparison, run_single_backtest};
use rebalab_runner::{save_artifacts, BacktestConfig};

#[derive(Parser)]
#[command(
    name = "rebalab",
    about = "Rebalab CLI: portfolio rebalancing backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run every strategy in a config over the same prices and tabulate them.
    Compare {
        /// Path to a TOML config file with `[[compare]]` entries.
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the date range, assets and dataset hash of a price file.
    Inspect {
        /// `.csv` or `.parquet` price file.
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output_dir } => run_backtest_cmd(&config, &output_dir),
        Commands::Compare { config } => run_compare_cmd(&config),
        Commands::Inspect { data } => run_inspect_cmd(&data),
    }
}

fn run_backtest_cmd(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = BacktestConfig::from_file(config_path)?;
    let result = run_single_backtest(&config)?;

    print_summary(&result);

    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_compare_cmd(config_path: &Path) -> Result<()> {
    let config = BacktestConfig::from_file(config_path)?;
    let outcomes = run_comparison(&config)?;

    println!();
    println!(
        "{:<24} {:>12} {:>8} {:>9}",
        "Strategy", "Total Ret", "Trades", "Win Rate"
    );
    println!("{}", "-".repeat(56));
    for outcome in &outcomes {
        let name = &outcome.strategy.strategy_type;
        match &outcome.result {
            Ok(r) => println!(
                "{:<24} {:>11.2}% {:>8} {:>8.1}%",
                name,
                r.total_return() * 100.0,
                r.trade_stats.trade_count,
                r.win_rate() * 100.0
            ),
            Err(e) => println!("{name:<24} ERROR: {e}"),
        }
    }

    if outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .any(BacktestResult::has_synthetic)
    {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
    Ok(())
}

fn run_inspect_cmd(path: &Path) -> Result<()> {
    let table = load_price_table(path)?;
    let hash = dataset_hash(&table);

    println!("File:     {}", path.display());
    match (table.first_date(), table.last_date()) {
        (Some(first), Some(last)) => println!("Period:   {first} to {last}"),
        _ => println!("Period:   (empty)"),
    }
    println!("Rows:     {}", table.n_rows());
    println!("Hash:     {hash}");
    println!();
    println!("{:<12} {:>8}", "Asset", "Missing");
    println!("{}", "-".repeat(21));
    for (i, asset) in table.assets().iter().enumerate() {
        let missing = table.column(i).iter().filter(|p| p.is_nan()).count();
        println!("{asset:<12} {missing:>8}");
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.strategy);
    if let (Some(first), Some(last)) = (
        result.portfolio_returns.dates.first(),
        result.portfolio_returns.dates.last(),
    ) {
        println!("Period:         {first} to {last}");
    }
    println!(
        "Rows:           {} ({} warmup)",
        result.portfolio_returns.len(),
        result.params.warmup_rows()
    );
    println!("Dataset:        {}", result.dataset_hash.short());
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", result.total_return() * 100.0);
    println!("Trades:         {}", result.trade_stats.trade_count);
    println!("Win Rate:       {:.1}%", result.win_rate() * 100.0);
    for warning in &result.warnings {
        match warning {
            RunWarning::SyntheticData => {
                println!();
                println!("WARNING: Results based on SYNTHETIC data");
            }
            RunWarning::DegenerateRows { count, first } => {
                println!("WARNING: {count} row(s) with no position after warm-up, first on {first}");
            }
        }
    }
    println!();
}
