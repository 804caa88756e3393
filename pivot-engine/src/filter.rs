//! FILENAME: pivot-engine/src/filter.rs
//! Row Filter - applies field filters before grouping.
//!
//! Active filters combine with AND; the values within one filter combine with
//! OR. Comparison happens on grouping labels, so a filter built from labels
//! shown in a header tree selects exactly the rows under those headers.

use rustc_hash::FxHashSet;
use tabular::{Row, DEFAULT_EMPTY_LABEL};

use crate::definition::{FilterMode, FilterSpec};

/// A filter with its selected values resolved to labels.
struct CompiledFilter<'a> {
    field: &'a str,
    labels: FxHashSet<String>,
    mode: FilterMode,
}

impl<'a> CompiledFilter<'a> {
    fn compile(spec: &'a FilterSpec, empty_label: &str) -> Self {
        CompiledFilter {
            field: &spec.field,
            labels: spec
                .selected_values
                .iter()
                .map(|v| v.group_label(empty_label))
                .collect(),
            mode: spec.mode,
        }
    }

    fn passes(&self, row: &Row, empty_label: &str) -> bool {
        let hit = self.labels.contains(&row.get(self.field).group_label(empty_label));
        match self.mode {
            FilterMode::Include => hit,
            FilterMode::Exclude => !hit,
        }
    }
}

/// Returns the indices of the rows that pass every active filter, in order.
pub fn filter_row_indices(rows: &[Row], filters: &[FilterSpec], empty_label: &str) -> Vec<usize> {
    let compiled: Vec<CompiledFilter> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| CompiledFilter::compile(f, empty_label))
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| compiled.iter().all(|f| f.passes(row, empty_label)))
        .map(|(idx, _)| idx)
        .collect()
}

/// Returns the rows that pass every active filter, in order.
pub fn filter_rows<'a>(rows: &'a [Row], filters: &[FilterSpec]) -> Vec<&'a Row> {
    filter_row_indices(rows, filters, DEFAULT_EMPTY_LABEL)
        .into_iter()
        .map(|idx| &rows[idx])
        .collect()
}
