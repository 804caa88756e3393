//! FILENAME: pivot-engine/src/widget.rs
//! Dashboard widgets.
//!
//! A widget is a small saved question over the table: a single KPI number, a
//! chart over one grouping field, or a full pivot table. Each kind carries only
//! its own fields; the JSON form is tagged by `"type"`.

use serde::{Deserialize, Serialize};
use tabular::{Row, Scalar, DEFAULT_EMPTY_LABEL};

use crate::aggregate::aggregate;
use crate::chart::{to_chart_series, ChartPoint};
use crate::crosstab::{assemble, CrossTabResult};
use crate::definition::{AggregatorKind, FilterSpec, PivotConfig, ValueFieldSpec};
use crate::error::PivotError;
use crate::filter::filter_row_indices;

/// Shown in place of a KPI with no data.
pub const NO_DATA_LABEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

/// A saved dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WidgetConfig {
    Kpi {
        #[serde(default)]
        title: String,
        field: String,
        aggregator: AggregatorKind,
        #[serde(default)]
        filters: Vec<FilterSpec>,
    },
    Chart {
        #[serde(default)]
        title: String,
        #[serde(default)]
        chart_kind: ChartKind,
        group_by: String,
        value: ValueFieldSpec,
        #[serde(default)]
        filters: Vec<FilterSpec>,
        /// Keep only the first `limit` categories.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    Table {
        #[serde(default)]
        title: String,
        pivot: PivotConfig,
    },
}

impl WidgetConfig {
    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn title(&self) -> &str {
        match self {
            WidgetConfig::Kpi { title, .. }
            | WidgetConfig::Chart { title, .. }
            | WidgetConfig::Table { title, .. } => title,
        }
    }
}

/// The evaluated content of a widget, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WidgetData {
    Kpi {
        title: String,
        value: Scalar,
        /// `value` as display text; `"N/A"` when there is no data.
        formatted: String,
    },
    Chart {
        title: String,
        chart_kind: ChartKind,
        series: Vec<ChartPoint>,
    },
    Table {
        title: String,
        result: CrossTabResult,
    },
}

/// Evaluates a widget against the source rows.
pub fn evaluate_widget(rows: &[Row], widget: &WidgetConfig) -> Result<WidgetData, PivotError> {
    match widget {
        WidgetConfig::Kpi {
            title,
            field,
            aggregator,
            filters,
        } => {
            let indices = filter_row_indices(rows, filters, DEFAULT_EMPTY_LABEL);
            let value = aggregate(indices.iter().map(|&idx| rows[idx].get(field)), *aggregator);
            let formatted = if value.is_null() {
                NO_DATA_LABEL.to_string()
            } else {
                value.to_string()
            };

            Ok(WidgetData::Kpi {
                title: title.clone(),
                value,
                formatted,
            })
        }
        WidgetConfig::Chart {
            title,
            chart_kind,
            group_by,
            value,
            filters,
            limit,
        } => {
            let pivot = PivotConfig {
                row_fields: vec![group_by.clone()],
                value_fields: vec![value.clone()],
                filters: filters.clone(),
                ..PivotConfig::default()
            };
            let result = assemble(rows, &pivot);

            let mut series = if result.is_empty() {
                Vec::new()
            } else {
                to_chart_series(&result, 0)?
            };
            if let Some(limit) = limit {
                series.truncate(*limit);
            }

            Ok(WidgetData::Chart {
                title: title.clone(),
                chart_kind: *chart_kind,
                series,
            })
        }
        WidgetConfig::Table { title, pivot } => Ok(WidgetData::Table {
            title: title.clone(),
            result: assemble(rows, pivot),
        }),
    }
}
