//! Dataset fingerprinting: a stable identity for the prices a result was computed on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::PriceTable;

/// BLAKE3 hex digest of a price table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// First 12 hex characters, for display in tables and logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash dates, asset names and the exact bit pattern of every price.
///
/// Two tables hash equal only if they are cell-for-cell identical, NaN payloads included.
pub fn dataset_hash(table: &PriceTable) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(table.n_rows() as u64).to_le_bytes());
    hasher.update(&(table.n_assets() as u64).to_le_bytes());
    for date in table.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for (a, asset) in table.assets().iter().enumerate() {
        hasher.update(&(asset.len() as u64).to_le_bytes());
        hasher.update(asset.as_bytes());
        for price in table.column(a) {
            hasher.update(&price.to_bits().to_le_bytes());
        }
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}
