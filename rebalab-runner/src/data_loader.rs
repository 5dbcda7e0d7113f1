//! Price loading and data resolution for the runner.
//!
//! A config names exactly one source:
//! 1. A file path: `.csv` or `.parquet`, read through the core loaders
//! 2. A synthetic table: deterministic random walks (tagged)
//!
//! Synthetic data is a developer-only debug mode. Results produced on it carry a
//! `SyntheticData` warning.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

use rebalab_core::calendar::{Calendar, Frequency};
use rebalab_core::data::{load_price_table, DataError, PriceTable};
use rebalab_core::error::InputShapeError;
use rebalab_core::fingerprint::{dataset_hash, DatasetHash};

use crate::config::{DataConfig, SyntheticConfig};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source configured")]
    NoSource,

    #[error("synthetic data error: {0}")]
    Synthetic(String),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

impl From<InputShapeError> for LoadError {
    fn from(e: InputShapeError) -> Self {
        LoadError::Data(DataError::Shape(e))
    }
}

/// Provenance of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Synthetic,
}

/// Result of loading prices, including data source provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub prices: Arc<PriceTable>,
    pub source: DataSource,
    /// BLAKE3 fingerprint of the table.
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
}

/// Load the table a config points at.
pub fn load_prices(config: &DataConfig) -> Result<LoadedData, LoadError> {
    let (prices, source) = match (&config.path, &config.synthetic) {
        (Some(path), _) => (load_price_table(path)?, DataSource::File(path.clone())),
        (None, Some(synthetic)) => {
            warn!(
                assets = synthetic.assets.len(),
                "generating synthetic prices; results will be tagged as synthetic"
            );
            (generate_synthetic_prices(synthetic)?, DataSource::Synthetic)
        }
        (None, None) => return Err(LoadError::NoSource),
    };

    let dataset_hash = dataset_hash(&prices);
    info!(
        rows = prices.n_rows(),
        assets = prices.n_assets(),
        hash = dataset_hash.short(),
        "prices loaded"
    );

    Ok(LoadedData {
        has_synthetic: source == DataSource::Synthetic,
        prices: Arc::new(prices),
        source,
        dataset_hash,
    })
}

/// Generate synthetic prices for testing/development.
///
/// One random walk per asset starting at 100.0, on every weekday in range. Each asset's
/// RNG is seeded from its name, so the same config always yields the same table.
pub fn generate_synthetic_prices(config: &SyntheticConfig) -> Result<PriceTable, LoadError> {
    let dates: Vec<NaiveDate> = Calendar::new(Frequency::Daily, config.start, config.end)
        .map_err(|e| LoadError::Synthetic(e.to_string()))?
        .all_dates()
        .to_vec();
    if dates.is_empty() {
        return Err(LoadError::Synthetic(format!(
            "no weekdays between {} and {}",
            config.start, config.end
        )));
    }

    let columns = config
        .assets
        .iter()
        .map(|asset| random_walk(asset, dates.len()))
        .collect();
    Ok(PriceTable::new(dates, config.assets.clone(), columns)?)
}

fn random_walk(asset: &str, len: usize) -> Vec<f64> {
    // Deterministic seed from asset name
    let seed: [u8; 32] = *blake3::hash(asset.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut price = 100.0_f64;
    (0..len)
        .map(|_| {
            let current = price;
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            current
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(assets: &[&str]) -> SyntheticConfig {
        SyntheticConfig {
            assets: assets.iter().map(|a| a.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    #[test]
    fn synthetic_is_deterministic_per_asset() {
        let a = generate_synthetic_prices(&synthetic(&["SPY", "QQQ"])).unwrap();
        let b = generate_synthetic_prices(&synthetic(&["QQQ"])).unwrap();
        assert_eq!(a.column(1), b.column(0));
        assert_ne!(a.column(0), a.column(1));
        assert_eq!(a.column(0)[0], 100.0);
    }

    #[test]
    fn synthetic_skips_weekends() {
        let t = generate_synthetic_prices(&synthetic(&["X"])).unwrap();
        // Q1 2024 has 65 weekdays
        assert_eq!(t.n_rows(), 65);
        assert!(t.column(0).iter().all(|p| *p > 0.0));
    }

    #[test]
    fn weekend_only_range_is_rejected() {
        let mut cfg = synthetic(&["X"]);
        cfg.start = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        cfg.end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert!(matches!(
            generate_synthetic_prices(&cfg),
            Err(LoadError::Synthetic(_))
        ));
    }

    #[test]
    fn load_tags_synthetic_source() {
        let loaded = load_prices(&DataConfig {
            path: None,
            synthetic: Some(synthetic(&["A", "B"])),
        })
        .unwrap();
        assert!(loaded.has_synthetic);
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert_eq!(loaded.dataset_hash, dataset_hash(&loaded.prices));
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(matches!(
            load_prices(&DataConfig::default()),
            Err(LoadError::NoSource)
        ));
    }

    #[test]
    fn unsupported_extension_surfaces_data_error() {
        let cfg = DataConfig {
            path: Some(PathBuf::from("prices.xlsx")),
            synthetic: None,
        };
        assert!(matches!(
            load_prices(&cfg),
            Err(LoadError::Data(DataError::UnsupportedFormat(_)))
        ));
    }
}
