//! FILENAME: tabular/src/scalar.rs
//! PURPOSE: Defines the value a single field of a row can hold.
//! CONTEXT: Rows come from arbitrary user uploads, so a field is loosely
//! typed. Grouping reads a value through `group_label`, aggregation through
//! `as_number`; both live here so every consumer sees the same coercions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::number::{format_number, is_numeric_text, parse_float};

/// Label used for null, absent or empty-string values when grouping.
pub const DEFAULT_EMPTY_LABEL: &str = "(empty)";

/// Format used for date labels. Fixed so output never depends on locale.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The possible values of a row field.
///
/// JSON rows map `null`, booleans, numbers and strings onto the matching
/// variants. `Date` is only produced by ingestion code and serializes as an
/// ISO date string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    #[serde(skip_deserializing)]
    Date(NaiveDate),
}

impl Scalar {
    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Null and the empty string both count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Lenient numeric reading used by the numeric aggregators.
    ///
    /// Numbers pass through (except NaN), text goes through `parse_float`,
    /// everything else has no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if !n.is_nan() => Some(*n),
            Scalar::Text(s) => parse_float(s),
            _ => None,
        }
    }

    /// Strict numeric reading: the whole value must be a finite number.
    pub fn as_strict_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Text(s) if is_numeric_text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The string a value is grouped and filtered by.
    pub fn group_label(&self, empty_label: &str) -> String {
        match self {
            Scalar::Null => empty_label.to_string(),
            Scalar::Text(s) if s.is_empty() => empty_label.to_string(),
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => format_number(*n),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}
