//! FILENAME: tabular/src/lib.rs
//! PURPOSE: Shared row model for the cross-tab engine.
//! CONTEXT: Re-exports the value, row and table types used by `pivot-engine`
//! and by whatever ingestion layer produces rows.

pub mod error;
pub mod number;
pub mod row;
pub mod scalar;

pub use error::TableError;
pub use number::{format_number, is_numeric_text, parse_float};
pub use row::{rows_from_json, Row, Table};
pub use scalar::{Scalar, DATE_FORMAT, DEFAULT_EMPTY_LABEL};
