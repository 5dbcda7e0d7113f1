//! Date-indexed tables produced by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date × asset table of weights or per-asset values.
///
/// Used for the composition matrix, the lagged and normalized positions,
/// asset contributions and cumulative asset returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    pub dates: Vec<NaiveDate>,
    pub assets: Vec<String>,
    /// Row-major: `rows[t][a]`.
    pub rows: Vec<Vec<f64>>,
}

impl WeightMatrix {
    /// All-zero matrix with the given index and columns.
    pub fn zeros(dates: Vec<NaiveDate>, assets: Vec<String>) -> Self {
        let rows = vec![vec![0.0; assets.len()]; dates.len()];
        Self {
            dates,
            assets,
            rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.assets.is_empty()
    }

    pub fn row(&self, t: usize) -> &[f64] {
        &self.rows[t]
    }

    pub fn get(&self, t: usize, asset: usize) -> f64 {
        self.rows[t][asset]
    }

    pub fn set(&mut self, t: usize, asset: usize, value: f64) {
        self.rows[t][asset] = value;
    }

    /// Values of one asset column, top to bottom.
    pub fn column(&self, asset: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[asset]).collect()
    }

    /// Copy without the first `n` rows.
    pub fn skip_rows(&self, n: usize) -> Self {
        let n = n.min(self.rows.len());
        Self {
            dates: self.dates[n..].to_vec(),
            assets: self.assets.clone(),
            rows: self.rows[n..].to_vec(),
        }
    }
}

/// Date → value series (portfolio returns, cumulative returns, cost series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl DatedSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Value on a given date, if present.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Copy without the first `n` entries.
    pub fn skip_rows(&self, n: usize) -> Self {
        let n = n.min(self.values.len());
        Self {
            dates: self.dates[n..].to_vec(),
            values: self.values[n..].to_vec(),
        }
    }
}
