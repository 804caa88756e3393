//! FILENAME: pivot-engine/src/crosstab.rs
//! Cross-Tab Assembler - The calculation core that turns rows into a result.
//!
//! Algorithm:
//! 1. Sanitize the config and filter the source rows
//! 2. Build the row and column header trees over the filtered rows
//! 3. Bucket every filtered row by (row leaf, column leaf) in a single pass
//! 4. Aggregate each bucket into a matrix cell, one value per value field
//! 5. Re-aggregate raw rows for every header node (subtotals) and for the
//!    whole filtered set (grand total)
//!
//! Subtotals and the grand total are never derived from other aggregates, so
//! non-additive aggregators (average, min, max, distinct count) stay exact.

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tabular::{Row, Scalar};

use crate::aggregate::aggregate_rows;
use crate::definition::{PivotConfig, ValueFieldSpec};
use crate::filter::filter_row_indices;
use crate::keys::{build_key_tree, find_group, leaves, HeaderGroup, KeyPath, KeyTree};

// ============================================================================
// RESULT
// ============================================================================

/// The full output of one assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTabResult {
    pub row_tree: Vec<HeaderGroup>,
    pub col_tree: Vec<HeaderGroup>,

    /// Leaf row paths; `matrix` is indexed by position in this list.
    pub row_leaves: Vec<KeyPath>,

    /// Leaf column paths; the inner `matrix` index.
    pub col_leaves: Vec<KeyPath>,

    /// `matrix[row_leaf][col_leaf][value_field]`.
    pub matrix: Vec<Vec<Vec<Scalar>>>,

    /// Subtotal of every row node (leaves included), keyed by path.
    /// Mirrors `HeaderGroup::subtotal`, so it is not serialized.
    #[serde(skip)]
    pub row_subtotals: FxHashMap<KeyPath, Vec<Scalar>>,

    #[serde(skip)]
    pub col_subtotals: FxHashMap<KeyPath, Vec<Scalar>>,

    pub grand_total: Vec<Scalar>,

    /// Display label of each value field, in spec order.
    pub value_labels: Vec<String>,

    pub source_row_count: usize,
    pub filtered_row_count: usize,
}

impl CrossTabResult {
    /// A result with no leaves. The grand total still has one (null) entry
    /// per value field.
    fn empty(value_fields: &[ValueFieldSpec], source_row_count: usize, filtered_row_count: usize) -> Self {
        CrossTabResult {
            row_tree: Vec::new(),
            col_tree: Vec::new(),
            row_leaves: Vec::new(),
            col_leaves: Vec::new(),
            matrix: Vec::new(),
            row_subtotals: FxHashMap::default(),
            col_subtotals: FxHashMap::default(),
            grand_total: vec![Scalar::Null; value_fields.len()],
            value_labels: value_fields.iter().map(ValueFieldSpec::label).collect(),
            source_row_count,
            filtered_row_count,
        }
    }

    /// True when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.row_leaves.is_empty()
    }

    pub fn value_field_count(&self) -> usize {
        self.value_labels.len()
    }

    pub fn cell(&self, row_leaf: usize, col_leaf: usize) -> Option<&[Scalar]> {
        self.matrix
            .get(row_leaf)
            .and_then(|row| row.get(col_leaf))
            .map(Vec::as_slice)
    }

    /// Row leaf groups in tree order. Empty when there are no row fields.
    pub fn row_leaf_groups(&self) -> Vec<&HeaderGroup> {
        leaves(&self.row_tree)
    }

    pub fn col_leaf_groups(&self) -> Vec<&HeaderGroup> {
        leaves(&self.col_tree)
    }

    pub fn row_group(&self, path: &[String]) -> Option<&HeaderGroup> {
        find_group(&self.row_tree, path)
    }

    pub fn col_group(&self, path: &[String]) -> Option<&HeaderGroup> {
        find_group(&self.col_tree, path)
    }

    pub fn row_subtotal(&self, path: &[String]) -> Option<&[Scalar]> {
        self.row_subtotals.get(path).map(Vec::as_slice)
    }

    pub fn col_subtotal(&self, path: &[String]) -> Option<&[Scalar]> {
        self.col_subtotals.get(path).map(Vec::as_slice)
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Builds the cross-tab for `rows` under `config`.
///
/// Never fails: bad data degrades to nulls and empty groups, a config with
/// no value fields or a filter that removes every row yields an empty result.
pub fn assemble(rows: &[Row], config: &PivotConfig) -> CrossTabResult {
    let config = config.sanitized();
    let value_fields = &config.value_fields;

    let source_indices = filter_row_indices(rows, &config.filters, &config.options.empty_label);
    let filtered: Vec<&Row> = source_indices.iter().map(|&idx| &rows[idx]).collect();

    if value_fields.is_empty() || filtered.is_empty() {
        debug!(
            "cross-tab has nothing to show ({} value fields, {} of {} rows after filters)",
            value_fields.len(),
            filtered.len(),
            rows.len()
        );
        return CrossTabResult::empty(value_fields, rows.len(), filtered.len());
    }

    let mut row_keys = build_key_tree(&filtered, &config.row_fields, &config.options);
    let mut col_keys = build_key_tree(&filtered, &config.col_fields, &config.options);

    let matrix = fill_matrix(&filtered, &row_keys, &col_keys, value_fields);

    let row_subtotals = apply_subtotals(&mut row_keys, &filtered, &source_indices, value_fields);
    let col_subtotals = apply_subtotals(&mut col_keys, &filtered, &source_indices, value_fields);

    let all_rows: Vec<usize> = (0..filtered.len()).collect();
    let grand_total = aggregate_rows(&filtered, &all_rows, value_fields);

    debug!(
        "assembled cross-tab: {} of {} rows, {} row leaves x {} column leaves x {} value fields",
        filtered.len(),
        rows.len(),
        row_keys.leaf_count(),
        col_keys.leaf_count(),
        value_fields.len()
    );

    CrossTabResult {
        row_tree: row_keys.tree,
        col_tree: col_keys.tree,
        row_leaves: row_keys.flat_keys,
        col_leaves: col_keys.flat_keys,
        matrix,
        row_subtotals,
        col_subtotals,
        grand_total,
        value_labels: value_fields.iter().map(ValueFieldSpec::label).collect(),
        source_row_count: rows.len(),
        filtered_row_count: filtered.len(),
    }
}

/// Buckets rows by leaf pair, then aggregates every bucket.
fn fill_matrix(
    rows: &[&Row],
    row_keys: &KeyTree,
    col_keys: &KeyTree,
    value_fields: &[ValueFieldSpec],
) -> Vec<Vec<Vec<Scalar>>> {
    let row_count = row_keys.leaf_count();
    let col_count = col_keys.leaf_count();

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); row_count * col_count];
    for row_idx in 0..rows.len() {
        let bucket = row_keys.leaf_of_row[row_idx] * col_count + col_keys.leaf_of_row[row_idx];
        buckets[bucket].push(row_idx);
    }

    (0..row_count)
        .map(|r| {
            (0..col_count)
                .map(|c| aggregate_rows(rows, &buckets[r * col_count + c], value_fields))
                .collect()
        })
        .collect()
}

/// Fills `subtotal` on every node, rewrites node rows to source indices and
/// returns the subtotals keyed by path.
fn apply_subtotals(
    keys: &mut KeyTree,
    rows: &[&Row],
    source_indices: &[usize],
    value_fields: &[ValueFieldSpec],
) -> FxHashMap<KeyPath, Vec<Scalar>> {
    fn visit(
        nodes: &mut [HeaderGroup],
        rows: &[&Row],
        source_indices: &[usize],
        value_fields: &[ValueFieldSpec],
        out: &mut FxHashMap<KeyPath, Vec<Scalar>>,
    ) {
        for node in nodes {
            node.subtotal = aggregate_rows(rows, &node.rows, value_fields);
            out.insert(node.path.clone(), node.subtotal.clone());
            for row in node.rows.iter_mut() {
                *row = source_indices[*row];
            }
            visit(&mut node.children, rows, source_indices, value_fields, out);
        }
    }

    let mut subtotals = FxHashMap::default();
    visit(&mut keys.tree, rows, source_indices, value_fields, &mut subtotals);

    // With no grouping fields the single leaf has no node of its own.
    if keys.tree.is_empty() {
        for (leaf, path) in keys.flat_keys.iter().enumerate() {
            subtotals.insert(path.clone(), aggregate_rows(rows, keys.leaf_rows(leaf), value_fields));
        }
    }

    subtotals
}

// ============================================================================
// DRILL DOWN
// ============================================================================

/// The source rows behind one cell, subtotal or grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownResult {
    pub row_path: Vec<String>,
    pub col_path: Vec<String>,

    /// Indices into the source rows.
    pub source_rows: Vec<usize>,

    /// Total count of matching rows.
    pub total_count: usize,

    /// Whether `source_rows` was cut off at `max_records`.
    pub is_truncated: bool,

    pub max_records: usize,
}

/// Finds the source rows under a row path and a column path.
///
/// Paths may be prefixes: a shorter row path drills into a row subtotal, an
/// empty path matches every filtered row along that axis.
pub fn drill_down(
    rows: &[Row],
    config: &PivotConfig,
    row_path: &[String],
    col_path: &[String],
    max_records: usize,
) -> DrillDownResult {
    let config = config.sanitized();
    let empty_label = &config.options.empty_label;

    let mut result = DrillDownResult {
        row_path: row_path.to_vec(),
        col_path: col_path.to_vec(),
        source_rows: Vec::new(),
        total_count: 0,
        is_truncated: false,
        max_records,
    };

    if row_path.len() > config.row_fields.len() || col_path.len() > config.col_fields.len() {
        return result;
    }

    let matches_path = |row: &Row, fields: &[String], path: &[String]| {
        fields
            .iter()
            .zip(path)
            .all(|(field, label)| &row.get(field).group_label(empty_label) == label)
    };

    for idx in filter_row_indices(rows, &config.filters, empty_label) {
        let row = &rows[idx];
        if matches_path(row, &config.row_fields, row_path) && matches_path(row, &config.col_fields, col_path) {
            result.total_count += 1;
            if result.source_rows.len() < max_records {
                result.source_rows.push(idx);
            }
        }
    }

    result.is_truncated = result.total_count > max_records;
    result
}
