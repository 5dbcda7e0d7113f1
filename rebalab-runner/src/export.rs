//! Result export: JSON and CSV artifacts.
//!
//! Every persisted result carries a `schema_version`. Newer versions than this build
//! understands are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use rebalab_core::engine::{BacktestResult, SCHEMA_VERSION};

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Export the return series as CSV: `date,portfolio_return,cumulative_return`.
pub fn export_returns_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "portfolio_return", "cumulative_return"])?;
    for ((date, r), c) in result
        .portfolio_returns
        .iter()
        .zip(result.cumulative_returns.values.iter())
    {
        wtr.write_record([date.to_string(), r.to_string(), c.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Save the artifact set for a single backtest run.
///
/// Creates `{strategy}_{dataset hash prefix}_{timestamp}/` under `output_dir` containing
/// `result.json` (the full result) and `returns.csv`. Returns the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}_{}",
        result.strategy,
        result.dataset_hash.short(),
        chrono::Local::now().format("%Y%m%d_%H%M%S%.3f")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("result.json"), export_json(result)?)?;
    std::fs::write(run_dir.join("returns.csv"), export_returns_csv(result)?)?;

    Ok(run_dir)
}

/// Load a result previously written by [`save_artifacts`].
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
