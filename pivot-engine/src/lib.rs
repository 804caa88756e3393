//! FILENAME: pivot-engine/src/lib.rs
//! Cross-tab aggregation engine.
//!
//! Turns a flat table of rows (see the `tabular` crate) and a pivot
//! configuration into a hierarchical cross-tab: row and column header trees,
//! a dense value matrix, subtotals and a grand total. Every entry point is a
//! pure function of its inputs; callers own any caching.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `aggregate`: Value coercion and aggregators
//! - `filter`: Row filtering ahead of grouping
//! - `keys`: Header tree construction (HOW rows are grouped)
//! - `crosstab`: Assembly of the result and drill-down
//! - `chart`: Flat series for chart rendering
//! - `widget`: Dashboard widgets built on the layers above

pub mod aggregate;
pub mod chart;
pub mod crosstab;
pub mod definition;
pub mod error;
pub mod filter;
pub mod keys;
pub mod widget;

pub use aggregate::{aggregate, aggregate_rows, AggregateAccumulator};
pub use chart::{to_chart_series, ChartPoint};
pub use crosstab::{assemble, drill_down, CrossTabResult, DrillDownResult};
pub use definition::*;
pub use error::PivotError;
pub use filter::{filter_row_indices, filter_rows};
pub use keys::{build_key_tree, HeaderGroup, KeyPath, KeyTree};
pub use widget::{evaluate_widget, ChartKind, WidgetConfig, WidgetData};
