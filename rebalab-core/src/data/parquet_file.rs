//! Parquet and in-memory Polars price tables.
//!
//! Layout: a `date` column of Polars `Date` dtype plus one numeric column per asset.
//! Nulls become missing prices (`NaN`). Numeric columns of any width are cast to `f64`.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::error::DataError;
use super::price_table::PriceTable;

const DATE_COLUMN: &str = "date";

/// Load a price table from a Parquet file.
pub fn read_price_parquet(path: &Path) -> Result<PriceTable, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;
    PriceTable::from_dataframe(&df)
}

/// Write a price table to a Parquet file.
pub fn write_price_parquet(table: &PriceTable, path: &Path) -> Result<(), DataError> {
    let mut df = table.to_dataframe()?;
    let file = fs::File::create(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

impl PriceTable {
    /// Convert a wide DataFrame (date + one column per asset) into a price table.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, DataError> {
        let dates_col = df
            .column(DATE_COLUMN)
            .map_err(|_| DataError::Validation(format!("missing column '{DATE_COLUMN}'")))?;
        let date_ca = dates_col
            .date()
            .map_err(|e| DataError::Parquet(format!("date column type: {e}")))?;

        let n = df.height();
        let epoch = unix_epoch();
        let mut dates = Vec::with_capacity(n);
        for i in 0..n {
            let days = date_ca
                .get(i)
                .ok_or_else(|| DataError::Parquet(format!("null date at row {i}")))?;
            dates.push(epoch + chrono::Duration::days(days as i64));
        }

        let mut assets = Vec::new();
        let mut columns = Vec::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == DATE_COLUMN {
                continue;
            }
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| DataError::Parquet(format!("column '{name}' is not numeric: {e}")))?;
            let values = casted
                .f64()
                .map_err(|e| DataError::Parquet(format!("column '{name}' type: {e}")))?;

            let mut prices = Vec::with_capacity(n);
            for (row, value) in values.into_iter().enumerate() {
                let price = value.unwrap_or(f64::NAN);
                if price < 0.0 || price.is_infinite() {
                    return Err(DataError::InvalidPrice {
                        row,
                        asset: name.to_string(),
                        value: price.to_string(),
                    });
                }
                prices.push(price);
            }

            assets.push(name.to_string());
            columns.push(prices);
        }

        Ok(Self::new(dates, assets, columns)?)
    }

    /// Convert into a wide DataFrame.
    pub fn to_dataframe(&self) -> Result<DataFrame, DataError> {
        let epoch = unix_epoch();
        let days: Vec<i32> = self
            .dates()
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();

        let mut columns = Vec::with_capacity(self.n_assets() + 1);
        columns.push(
            Column::new(DATE_COLUMN.into(), days)
                .cast(&DataType::Date)
                .map_err(|e| DataError::Parquet(format!("date cast: {e}")))?,
        );
        for (i, asset) in self.assets().iter().enumerate() {
            columns.push(Column::new(asset.as_str().into(), self.column(i).to_vec()));
        }

        DataFrame::new(columns).map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
    }
}

fn unix_epoch() -> NaiveDate {
    // chrono's default date is 1970-01-01
    NaiveDate::default()
}
