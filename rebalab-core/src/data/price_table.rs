//! Immutable date × asset price table and the truncated views handed to strategies.
//!
//! Prices are stored column-major. `NaN` marks a missing observation; it is allowed
//! anywhere but is expected only at the boundaries of an asset's listing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::InputShapeError;

/// Prices keyed by date (strictly increasing) and asset (unique).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Build a table from one price vector per asset.
    ///
    /// Zero rows or zero columns are accepted here; the backtester rejects them
    /// before a run starts.
    pub fn new(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, InputShapeError> {
        if columns.len() != assets.len() {
            return Err(InputShapeError::ColumnCount {
                expected: assets.len(),
                actual: columns.len(),
            });
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for (i, asset) in assets.iter().enumerate() {
            if asset.trim().is_empty() {
                return Err(InputShapeError::EmptyAssetName(i));
            }
            if !seen.insert(asset.as_str()) {
                return Err(InputShapeError::DuplicateAsset(asset.clone()));
            }
        }

        for (asset, column) in assets.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(InputShapeError::RaggedColumn {
                    asset: asset.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(InputShapeError::NonMonotonicDates {
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }

        Ok(Self {
            dates,
            assets,
            columns,
        })
    }

    /// Build a table from row-major data (`rows[t][a]`).
    pub fn from_rows(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, InputShapeError> {
        let mut columns = vec![Vec::with_capacity(rows.len()); assets.len()];
        for row in &rows {
            if row.len() != assets.len() {
                return Err(InputShapeError::ColumnCount {
                    expected: assets.len(),
                    actual: row.len(),
                });
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(*value);
            }
        }
        Self::new(dates, assets, columns)
    }

    /// Error unless the table has at least one row and one column.
    pub fn ensure_non_empty(&self) -> Result<(), InputShapeError> {
        if self.dates.is_empty() {
            return Err(InputShapeError::EmptyDates);
        }
        if self.assets.is_empty() {
            return Err(InputShapeError::EmptyAssets);
        }
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.assets.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column(&self, asset: usize) -> &[f64] {
        &self.columns[asset]
    }

    pub fn column_by_name(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn price(&self, row: usize, asset: usize) -> f64 {
        self.columns[asset][row]
    }

    /// Row index of a date, if the table contains it.
    pub fn row_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Restrict the table to the given dates (those absent from the table are skipped).
    pub fn select_dates(&self, dates: &[NaiveDate]) -> PriceTable {
        let rows: Vec<usize> = dates.iter().filter_map(|d| self.row_index(*d)).collect();
        PriceTable {
            dates: rows.iter().map(|&r| self.dates[r]).collect(),
            assets: self.assets.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }

    /// All assets, rows `0..=row`.
    pub fn history(&self, row: usize) -> PriceHistory<'_> {
        let end = (row + 1).min(self.dates.len());
        PriceHistory {
            dates: &self.dates[..end],
            assets: &self.assets,
            columns: self.columns.iter().map(|c| &c[..end]).collect(),
        }
    }

    /// One asset, rows `0..=row`.
    pub fn asset_history(&self, row: usize, asset: usize) -> PriceHistory<'_> {
        let end = (row + 1).min(self.dates.len());
        PriceHistory {
            dates: &self.dates[..end],
            assets: std::slice::from_ref(&self.assets[asset]),
            columns: vec![&self.columns[asset][..end]],
        }
    }
}

/// Read-only view of a [`PriceTable`] truncated at the decision date.
///
/// This is the only price access a strategy gets. It cannot reach rows after the
/// current date.
#[derive(Debug, Clone)]
pub struct PriceHistory<'a> {
    dates: &'a [NaiveDate],
    assets: &'a [String],
    columns: Vec<&'a [f64]>,
}

impl<'a> PriceHistory<'a> {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &'a [NaiveDate] {
        self.dates
    }

    pub fn assets(&self) -> &'a [String] {
        self.assets
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn is_single_asset(&self) -> bool {
        self.assets.len() == 1
    }

    /// The decision date (last visible row).
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column(&self, asset: usize) -> &'a [f64] {
        self.columns[asset]
    }

    pub fn column_by_name(&self, asset: &str) -> Option<&'a [f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|i| self.columns[i])
    }

    /// Latest visible price of an asset.
    pub fn latest(&self, asset: usize) -> Option<f64> {
        self.columns[asset].last().copied()
    }

    /// Simple return over the last `lookback` rows: `p[t] / p[t - lookback] - 1`.
    ///
    /// `None` when there is not enough history or either price is missing or zero.
    pub fn lookback_return(&self, asset: usize, lookback: usize) -> Option<f64> {
        let col = self.columns[asset];
        if lookback == 0 || col.len() <= lookback {
            return None;
        }
        let now = col[col.len() - 1];
        let then = col[col.len() - 1 - lookback];
        if !now.is_finite() || !then.is_finite() || then == 0.0 {
            return None;
        }
        Some(now / then - 1.0)
    }

    /// Period-over-period returns of the last `lookback` rows (skipping missing prices).
    pub fn recent_returns(&self, asset: usize, lookback: usize) -> Vec<f64> {
        let col = self.columns[asset];
        let start = col.len().saturating_sub(lookback.saturating_add(1));
        col[start..]
            .windows(2)
            .filter(|w| w[0].is_finite() && w[1].is_finite() && w[0] != 0.0)
            .map(|w| w[1] / w[0] - 1.0)
            .collect()
    }
}
