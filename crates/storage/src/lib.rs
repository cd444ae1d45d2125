//! Storage Layer
//!
//! Read-only historical sales table keyed by (store, year, month), loaded
//! from CSV, plus download-if-missing fetching of model and data artifacts.

mod artifacts;
mod loader;
mod table;

pub use artifacts::ArtifactSource;
pub use loader::{load_csv, read_csv};
pub use table::{ObservationRecord, SalesTable, StoreId};

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Download failed: {0}")]
    Download(String),
    #[error("Artifact not found at {0} and no download URL configured")]
    ArtifactMissing(PathBuf),
}
