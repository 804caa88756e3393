//! FILENAME: tabular/src/row.rs
//! PURPOSE: Sparse rows and the table that holds them.
//! CONTEXT: Rows in one upload share a header set, but any row may omit any
//! field. Lookups therefore never fail: an absent field reads as `Null`.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::scalar::Scalar;

static NULL: Scalar = Scalar::Null;

/// A single row: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: FxHashMap<String, Scalar>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the value of `field`, or `Null` when the row does not have it.
    pub fn get(&self, field: &str) -> &Scalar {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (field, value) in iter {
            row.insert(field, value);
        }
        row
    }
}

/// Parses a JSON array of objects into rows.
pub fn rows_from_json(json: &str) -> Result<Vec<Row>, TableError> {
    Ok(serde_json::from_str(json)?)
}

/// A table of rows plus the union of their field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Builds a table, collecting headers in first-seen row order.
    ///
    /// A `Row` is a hash map and does not remember the column order of the
    /// upload. Fields new to a given row are therefore added alphabetically:
    /// the first row's columns come out sorted, and later rows only append
    /// the fields they introduce. Hosts that need upload column order must
    /// carry it alongside the rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut headers = Vec::new();

        for row in &rows {
            let mut fresh: Vec<&str> = row
                .fields
                .keys()
                .map(String::as_str)
                .filter(|k| !seen.contains(k))
                .collect();
            fresh.sort_unstable();
            for field in fresh {
                seen.insert(field);
                headers.push(field.to_string());
            }
        }

        Table { headers, rows }
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(Table::from_rows(rows_from_json(json)?))
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.headers.iter().any(|h| h == field)
    }

    /// Distinct grouping labels of `field` in first-seen order.
    /// This is the list a filter picker offers for that field.
    pub fn distinct_values(&self, field: &str, empty_label: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut values = Vec::new();
        for row in &self.rows {
            let label = row.get(field).group_label(empty_label);
            if seen.insert(label.clone()) {
                values.push(label);
            }
        }
        values
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
