//! Wide CSV price files: a `date` column (`YYYY-MM-DD`) followed by one column per asset.
//!
//! Empty cells are missing prices (`NaN`). Rows must already be sorted by date;
//! unsorted files are rejected rather than silently reordered.

use chrono::NaiveDate;
use std::io;
use std::path::Path;

use super::error::DataError;
use super::price_table::PriceTable;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load a price table from a CSV file.
pub fn read_price_csv(path: &Path) -> Result<PriceTable, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_price_csv(file)
}

/// Parse a price table from any CSV reader.
pub fn parse_price_csv<R: io::Read>(reader: R) -> Result<PriceTable, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::Csv(format!("header: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(DataError::Validation("CSV has no header row".into()));
    }
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); assets.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| DataError::Csv(format!("row {row}: {e}")))?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            DataError::InvalidDate {
                row,
                value: raw_date.to_string(),
            }
        })?;
        dates.push(date);

        for (i, asset) in assets.iter().enumerate() {
            let cell = record.get(i + 1).unwrap_or_default();
            columns[i].push(parse_price(cell, row, asset)?);
        }
    }

    Ok(PriceTable::new(dates, assets, columns)?)
}

fn parse_price(cell: &str, row: usize, asset: &str) -> Result<f64, DataError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    let invalid = || DataError::InvalidPrice {
        row,
        asset: asset.to_string(),
        value: cell.to_string(),
    };
    let value: f64 = cell.parse().map_err(|_| invalid())?;
    if value < 0.0 || value.is_infinite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Write a price table as a wide CSV file. Missing prices become empty cells.
pub fn write_price_csv(table: &PriceTable, path: &Path) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| DataError::Csv(e.to_string()))?;

    let mut header = Vec::with_capacity(table.n_assets() + 1);
    header.push("date".to_string());
    header.extend(table.assets().iter().cloned());
    wtr.write_record(&header)
        .map_err(|e| DataError::Csv(e.to_string()))?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(table.n_assets() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        for asset in 0..table.n_assets() {
            let price = table.price(row, asset);
            record.push(if price.is_nan() {
                String::new()
            } else {
                price.to_string()
            });
        }
        wtr.write_record(&record)
            .map_err(|e| DataError::Csv(e.to_string()))?;
    }

    wtr.flush().map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputShapeError;

    #[test]
    fn parses_wide_csv_with_gaps() {
        let input = "date,SPY,TLT\n2024-01-02,100.0,90\n2024-01-03,101.5,\n2024-01-04,102,91.25\n";
        let table = parse_price_csv(input.as_bytes()).unwrap();

        assert_eq!(table.assets(), &["SPY".to_string(), "TLT".to_string()]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.price(1, 0), 101.5);
        assert!(table.price(1, 1).is_nan());
        assert_eq!(table.price(2, 1), 91.25);
    }

    #[test]
    fn rejects_bad_date() {
        let input = "date,SPY\n01/02/2024,100\n";
        let err = parse_price_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { row: 0, .. }));
    }

    #[test]
    fn rejects_negative_price() {
        let input = "date,SPY\n2024-01-02,-1\n";
        let err = parse_price_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::InvalidPrice { .. }));
    }

    #[test]
    fn rejects_unsorted_rows() {
        let input = "date,SPY\n2024-01-03,100\n2024-01-02,101\n";
        let err = parse_price_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataError::Shape(InputShapeError::NonMonotonicDates { .. })
        ));
    }

    #[test]
    fn file_round_trip_keeps_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let input = "date,A\n2024-01-02,1.5\n2024-01-03,\n";
        let table = parse_price_csv(input.as_bytes()).unwrap();

        write_price_csv(&table, &path).unwrap();
        let reloaded = read_price_csv(&path).unwrap();

        assert_eq!(reloaded.dates(), table.dates());
        assert_eq!(reloaded.price(0, 0), 1.5);
        assert!(reloaded.price(1, 0).is_nan());
    }
}
