//! FILENAME: pivot-engine/src/error.rs

use thiserror::Error;

/// Errors surfaced to callers.
///
/// Bad data never produces one of these; it degrades to nulls and empty
/// groups instead. Only malformed inputs at the JSON boundary and broken
/// caller contracts do.
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Invalid pivot configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Invalid table data: {0}")]
    Table(#[from] tabular::TableError),

    #[error("Value field index {index} out of range ({count} value fields)")]
    ValueFieldOutOfRange { index: usize, count: usize },
}
