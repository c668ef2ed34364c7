// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions a caller may want to tell apart.
///
/// Everything else (plain I/O, CSV syntax) travels as `anyhow` context.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("source directory not found: {0}")]
    SourceMissing(PathBuf),

    #[error("no normalized data files found in {0}")]
    NoDataFiles(PathBuf),

    #[error("table `{table}`: metadata file missing at {path}")]
    MissingMetadata { table: String, path: PathBuf },

    #[error("table `{table}`: {reason}")]
    SchemaMismatch { table: String, reason: String },

    #[error("table `{table}`: row {row}, column `{column}`: `{value}` is not a DD/MM/YYYY date")]
    BadDate {
        table: String,
        row: usize,
        column: String,
        value: String,
    },
}

impl PrepError {
    pub fn mismatch(table: &str, reason: impl Into<String>) -> Self {
        PrepError::SchemaMismatch {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}
