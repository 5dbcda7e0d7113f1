//! Price data: the immutable price table and its file formats.

pub mod csv_file;
pub mod error;
pub mod parquet_file;
pub mod price_table;

pub use csv_file::{parse_price_csv, read_price_csv, write_price_csv};
pub use error::DataError;
pub use parquet_file::{read_price_parquet, write_price_parquet};
pub use price_table::{PriceHistory, PriceTable};

use std::path::Path;

/// Load a price table, choosing the reader from the file extension (`.csv` or `.parquet`).
pub fn load_price_table(path: &Path) -> Result<PriceTable, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => read_price_csv(path),
        Some("parquet") | Some("pq") => read_price_parquet(path),
        _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
    }
}
