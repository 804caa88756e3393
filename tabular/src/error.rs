//! FILENAME: tabular/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Invalid row data: {0}")]
    InvalidRows(#[from] serde_json::Error),
}
