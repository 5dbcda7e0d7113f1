//! Serializable backtest configuration, read from TOML.
//!
//! ```toml
//! [data]
//! path = "prices.csv"
//!
//! [run]
//! multi_assets = true
//! special_start = 20
//! transaction_cost = 0.001
//!
//! [strategy]
//! type = "top_n_momentum"
//! [strategy.params]
//! n = 2
//!
//! [[compare]]
//! type = "inverse_volatility"
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rebalab_core::engine::RunParameters;
use rebalab_core::strategy::StrategyConfig;

/// Unique identifier for a backtest configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where prices come from: a file, or a generated random walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// `.csv` or `.parquet` file. Relative paths are resolved against the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<SyntheticConfig>,
}

/// Deterministic random-walk prices for the listed assets on every weekday in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub assets: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Complete configuration of a backtest (or a comparison of several strategies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub run: RunParameters,
    pub strategy: StrategyConfig,
    /// Extra strategies run alongside `strategy` by `compare`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compare: Vec<StrategyConfig>,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: BacktestConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A relative `data.path` is made relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml(&text)?;
        if let (Some(data_path), Some(dir)) = (config.data.path.as_mut(), path.parent()) {
            if data_path.is_relative() {
                *data_path = dir.join(&*data_path);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.data.path, &self.data.synthetic) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "[data] takes either `path` or `synthetic`, not both".into(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "[data] needs a `path` or a `synthetic` table".into(),
                ))
            }
            (None, Some(s)) => {
                if s.assets.is_empty() {
                    return Err(ConfigError::Invalid("synthetic.assets is empty".into()));
                }
                if s.start > s.end {
                    return Err(ConfigError::Invalid(format!(
                        "synthetic.start {} is after synthetic.end {}",
                        s.start, s.end
                    )));
                }
            }
            (Some(_), None) => {}
        }

        self.run
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for s in std::iter::once(&self.strategy).chain(&self.compare) {
            if s.strategy_type.trim().is_empty() {
                return Err(ConfigError::Invalid("strategy type is empty".into()));
            }
        }
        Ok(())
    }

    /// Every strategy to run in a comparison, main strategy first.
    pub fn all_strategies(&self) -> Vec<StrategyConfig> {
        std::iter::once(self.strategy.clone())
            .chain(self.compare.iter().cloned())
            .collect()
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two identical configs share a `RunId`. Parameter maps are `BTreeMap`s, so the
    /// JSON serialization is canonical.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalab_core::calendar::Frequency;

    const FULL: &str = r#"
[data]
path = "prices.csv"

[run]
multi_assets = true
special_start = 20
transaction_cost = 0.001
slippage = 0.0005
rebalancing_frequency = "weekly"

[strategy]
type = "top_n_momentum"
[strategy.params]
n = 2
lookback = 20

[[compare]]
type = "inverse_volatility"

[[compare]]
type = "constant"
params = { weight = 0.5 }
"#;

    #[test]
    fn parses_full_config() {
        let c = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(c.data.path, Some(PathBuf::from("prices.csv")));
        assert!(c.run.multi_assets);
        assert_eq!(c.run.special_start, 20);
        assert_eq!(c.run.rebalancing_frequency, Frequency::Weekly);
        assert_eq!(c.strategy.params["n"], 2.0);
        assert_eq!(c.compare.len(), 2);
        assert_eq!(c.compare[1].params["weight"], 0.5);
        assert_eq!(c.all_strategies().len(), 3);
    }

    #[test]
    fn run_section_is_optional() {
        let c = BacktestConfig::from_toml(
            r#"
[data]
path = "p.parquet"
[strategy]
type = "constant"
"#,
        )
        .unwrap();
        assert_eq!(c.run, RunParameters::default());
        assert!(c.compare.is_empty());
    }

    #[test]
    fn synthetic_data_section() {
        let c = BacktestConfig::from_toml(
            r#"
[data]
synthetic = { assets = ["A", "B"], start = "2020-01-01", end = "2020-12-31" }
[strategy]
type = "momentum"
"#,
        )
        .unwrap();
        let s = c.data.synthetic.unwrap();
        assert_eq!(s.assets, vec!["A", "B"]);
        assert_eq!(s.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn rejects_missing_or_double_data_source() {
        let none = "[data]\n[strategy]\ntype = \"constant\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(none),
            Err(ConfigError::Invalid(_))
        ));

        let both = r#"
[data]
path = "x.csv"
synthetic = { assets = ["A"], start = "2020-01-01", end = "2020-02-01" }
[strategy]
type = "constant"
"#;
        assert!(matches!(
            BacktestConfig::from_toml(both),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_negative_costs() {
        let bad = r#"
[data]
path = "x.csv"
[run]
transaction_cost = -0.1
[strategy]
type = "constant"
"#;
        assert!(matches!(
            BacktestConfig::from_toml(bad),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            BacktestConfig::from_toml("[data\npath="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_deterministic_and_sensitive() {
        let a = BacktestConfig::from_toml(FULL).unwrap();
        let b = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let mut c = a.clone();
        c.run.slippage = 0.001;
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }
}
