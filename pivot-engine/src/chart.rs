//! FILENAME: pivot-engine/src/chart.rs
//! Chart-Data Projector - flattens a cross-tab into `{name, value}` points.
//!
//! Only row leaves are projected; column grouping is ignored. Points come out
//! in row-tree order, so a chart lists its categories in the same order as the
//! rows of the equivalent pivot table.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tabular::Scalar;

use crate::crosstab::CrossTabResult;
use crate::error::PivotError;

/// Joins path segments when a leaf's own label is ambiguous.
pub const PATH_SEPARATOR: &str = " / ";

/// Name of the single point produced when there are no row fields.
pub const TOTAL_LABEL: &str = "Total";

/// One chart category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: Scalar,
}

/// Projects the row leaves of `result` and one value field into chart points.
///
/// A leaf is named by its last path segment, or by its full path when another
/// leaf ends in the same segment.
pub fn to_chart_series(result: &CrossTabResult, value_field_index: usize) -> Result<Vec<ChartPoint>, PivotError> {
    let count = result.value_field_count();
    if value_field_index >= count {
        return Err(PivotError::ValueFieldOutOfRange {
            index: value_field_index,
            count,
        });
    }

    let mut last_segment_uses: FxHashMap<&str, usize> = FxHashMap::default();
    for path in &result.row_leaves {
        if let Some(last) = path.last() {
            *last_segment_uses.entry(last.as_str()).or_insert(0) += 1;
        }
    }

    let points = result
        .row_leaves
        .iter()
        .map(|path| {
            let name = match path.last() {
                None => TOTAL_LABEL.to_string(),
                Some(last) if last_segment_uses.get(last.as_str()).copied().unwrap_or(0) > 1 => {
                    path.join(PATH_SEPARATOR)
                }
                Some(last) => last.clone(),
            };

            let value = result
                .row_subtotal(path)
                .and_then(|subtotal| subtotal.get(value_field_index))
                .cloned()
                .unwrap_or_default();

            ChartPoint { name, value }
        })
        .collect();

    Ok(points)
}
