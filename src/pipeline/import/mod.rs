pub mod decode;
pub mod mapping;
pub mod normalize;
pub mod reconcile;

pub use decode::*;
pub use mapping::*;
pub use reconcile::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The CSV file is empty")]
    EmptyFile,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No compatible columns found for {entity}; expected headers like {expected}")]
    NoUsableColumns { entity: String, expected: String },

    #[error("Required columns missing from the CSV: {0}")]
    MissingRequiredColumns(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Outcome of one file import. Every row is accounted for: `imported` plus
/// the four skip counters equal the number of data rows left after blank
/// lines were removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows whose mapped cells all normalized to nothing (content only in
    /// ignored columns, or null markers throughout)
    pub skipped_empty: usize,
    pub skipped_missing_required: usize,
    pub skipped_duplicate_in_file: usize,
    pub skipped_existing: usize,
    /// CSV headers that matched nothing in the live schema and were dropped
    pub ignored_columns: Vec<String>,
    /// Visit imports only: how many rows also produced a vitals snapshot
    pub vitals_inserted: usize,
}

impl ImportReport {
    pub fn rows_considered(&self) -> usize {
        self.imported
            + self.skipped_empty
            + self.skipped_missing_required
            + self.skipped_duplicate_in_file
            + self.skipped_existing
    }
}
