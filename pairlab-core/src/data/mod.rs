//! Data layer: raw CSV ingestion, the processed Parquet store, dataset
//! fingerprints and deterministic sample data.
//!
//! Layout:
//! - raw input:  `{raw_dir}/*.csv`
//! - processed:  `{processed_dir}/{SYMBOL}.parquet`

pub mod fingerprint;
pub mod ingest;
pub mod store;
pub mod synthetic;

pub use fingerprint::dataset_hash;
pub use ingest::{ingest_dir, parse_csv, IngestError, IngestSummary};
pub use store::ProcessedStore;
pub use synthetic::{generate_sample_bars, write_sample_csv};

/// Errors from loading or writing processed data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// No processed file for the symbol.
    #[error("data for {symbol} not found")]
    Missing { symbol: String },

    /// The processed file exists but holds zero rows.
    #[error("data for {symbol} is empty")]
    Empty { symbol: String },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Missing and Empty mean "nothing to test", not a failure.
    pub fn is_skippable(&self) -> bool {
        matches!(self, DataError::Missing { .. } | DataError::Empty { .. })
    }
}
