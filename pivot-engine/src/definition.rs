//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a cross-tab.
//! These structures are designed to be:
//! - Deserialized from the JSON the UI layer produces (camelCase keys)
//! - Immutable snapshots of user intent
//! - Tolerant: optional knobs default, unknown aggregator names fall back

use std::fmt;
use std::str::FromStr;

use log::warn;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tabular::{Scalar, DEFAULT_EMPTY_LABEL};

use crate::error::PivotError;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregatorKind {
    Sum,
    /// Number of rows, including rows where the field is null.
    Count,
    Average,
    Min,
    Max,
    /// Number of rows where the field is neither null nor the empty string.
    CountNonEmpty,
    /// Number of distinct non-empty values.
    CountDistinct,
}

impl Default for AggregatorKind {
    fn default() -> Self {
        AggregatorKind::Sum
    }
}

impl AggregatorKind {
    pub const ALL: [AggregatorKind; 7] = [
        AggregatorKind::Sum,
        AggregatorKind::Count,
        AggregatorKind::Average,
        AggregatorKind::Min,
        AggregatorKind::Max,
        AggregatorKind::CountNonEmpty,
        AggregatorKind::CountDistinct,
    ];

    /// The identifier used in JSON configs.
    pub fn as_str(self) -> &'static str {
        match self {
            AggregatorKind::Sum => "sum",
            AggregatorKind::Count => "count",
            AggregatorKind::Average => "average",
            AggregatorKind::Min => "min",
            AggregatorKind::Max => "max",
            AggregatorKind::CountNonEmpty => "countNonEmpty",
            AggregatorKind::CountDistinct => "countDistinct",
        }
    }

    /// Human-readable prefix for default value field labels ("Sum of Sales").
    pub fn display_name(self) -> &'static str {
        match self {
            AggregatorKind::Sum => "Sum",
            AggregatorKind::Count => "Count",
            AggregatorKind::Average => "Average",
            AggregatorKind::Min => "Min",
            AggregatorKind::Max => "Max",
            AggregatorKind::CountNonEmpty => "Non-empty count",
            AggregatorKind::CountDistinct => "Distinct count",
        }
    }

    /// Whether totals of this aggregator equal the sum of their parts.
    pub fn is_additive(self) -> bool {
        matches!(self, AggregatorKind::Sum | AggregatorKind::Count | AggregatorKind::CountNonEmpty)
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregatorKind {
    type Err = String;

    /// Lenient parsing for names typed by users or older configs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "sum" | "total" => Ok(AggregatorKind::Sum),
            "count" => Ok(AggregatorKind::Count),
            "average" | "avg" | "mean" => Ok(AggregatorKind::Average),
            "min" | "minimum" => Ok(AggregatorKind::Min),
            "max" | "maximum" => Ok(AggregatorKind::Max),
            "countnonempty" | "countnotnull" | "counta" => Ok(AggregatorKind::CountNonEmpty),
            "countdistinct" | "countunique" | "distinct" => Ok(AggregatorKind::CountDistinct),
            _ => Err(format!("unknown aggregator '{}'", s)),
        }
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// One aggregation channel of a pivot. Every cross-tab cell holds one value
/// per spec, in spec order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFieldSpec {
    /// Source field the values are read from.
    pub field: String,

    pub aggregator: AggregatorKind,

    /// Display name (defaults to e.g. "Sum of Sales").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ValueFieldSpec {
    pub fn new(field: impl Into<String>, aggregator: AggregatorKind) -> Self {
        ValueFieldSpec {
            field: field.into(),
            aggregator,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} of {}", self.aggregator.display_name(), self.field),
        }
    }
}

// ============================================================================
// FILTER DEFINITIONS
// ============================================================================

/// Whether a filter keeps or hides the listed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    /// Keep only rows whose value is listed.
    #[default]
    Include,
    /// Hide rows whose value is listed.
    Exclude,
}

/// A field-level filter applied to the source rows before grouping.
///
/// Values are compared by their grouping label, so `"1"` selects both the
/// number `1` and the text `"1"`, and `null` selects the empty group.
/// An empty `selected_values` list leaves the filter inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub field: String,

    #[serde(default)]
    pub selected_values: Vec<Scalar>,

    #[serde(default)]
    pub mode: FilterMode,
}

impl FilterSpec {
    pub fn include<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        FilterSpec {
            field: field.into(),
            selected_values: values.into_iter().map(Into::into).collect(),
            mode: FilterMode::Include,
        }
    }

    pub fn exclude<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        FilterSpec {
            mode: FilterMode::Exclude,
            ..FilterSpec::include(field, values)
        }
    }

    pub fn is_active(&self) -> bool {
        !self.selected_values.is_empty()
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Order of group keys within one level of a header tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// First-seen order, unless every non-empty value of the field is
    /// numeric, in which case groups sort numerically ascending.
    Auto,
    /// First-seen order, always.
    DataSourceOrder,
    /// Numbers first (numerically), then text (lexicographically).
    Ascending,
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Auto
    }
}

/// Knobs that change how keys are built. All have defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PivotOptions {
    pub sort_order: SortOrder,

    /// Label given to null, absent and empty-string grouping values.
    pub empty_label: String,
}

impl Default for PivotOptions {
    fn default() -> Self {
        PivotOptions {
            sort_order: SortOrder::Auto,
            empty_label: DEFAULT_EMPTY_LABEL.to_string(),
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete definition of a cross-tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfig {
    /// Fields grouped into rows (ordered from outer to inner).
    #[serde(default)]
    pub row_fields: Vec<String>,

    /// Fields grouped into columns (ordered from outer to inner).
    #[serde(default)]
    pub col_fields: Vec<String>,

    #[serde(default)]
    pub value_fields: Vec<ValueFieldSpec>,

    #[serde(default)]
    pub filters: Vec<FilterSpec>,

    #[serde(default)]
    pub options: PivotOptions,
}

impl PivotConfig {
    pub fn new() -> Self {
        PivotConfig::default()
    }

    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn row(mut self, field: impl Into<String>) -> Self {
        self.row_fields.push(field.into());
        self
    }

    pub fn column(mut self, field: impl Into<String>) -> Self {
        self.col_fields.push(field.into());
        self
    }

    pub fn value(mut self, field: impl Into<String>, aggregator: AggregatorKind) -> Self {
        self.value_fields.push(ValueFieldSpec::new(field, aggregator));
        self
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.options.sort_order = sort_order;
        self
    }

    /// Returns a copy with repeated grouping fields removed.
    ///
    /// A field may be grouped once: later repeats within the row area, and
    /// column fields already used as row fields, are dropped.
    pub fn sanitized(&self) -> PivotConfig {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut dedupe = |fields: &[String], area: &str| -> Vec<String> {
            let mut kept = Vec::with_capacity(fields.len());
            for field in fields {
                if seen.insert(field.clone()) {
                    kept.push(field.clone());
                } else {
                    warn!("dropping duplicate {} grouping field '{}'", area, field);
                }
            }
            kept
        };

        let row_fields = dedupe(&self.row_fields, "row");
        let col_fields = dedupe(&self.col_fields, "column");

        PivotConfig {
            row_fields,
            col_fields,
            value_fields: self.value_fields.clone(),
            filters: self.filters.clone(),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let config = PivotConfig::from_json(
            r#"{
                "rowFields": ["Region"],
                "colFields": [],
                "valueFields": [{"field": "Sales", "aggregator": "countNonEmpty"}],
                "filters": [{"field": "Region", "selectedValues": ["East", null]}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.row_fields, vec!["Region"]);
        assert_eq!(config.value_fields[0].aggregator, AggregatorKind::CountNonEmpty);
        assert_eq!(config.filters[0].selected_values, vec![Scalar::text("East"), Scalar::Null]);
        assert_eq!(config.filters[0].mode, FilterMode::Include);
        assert_eq!(config.options, PivotOptions::default());
    }

    #[test]
    fn test_config_json_partial_options() {
        let config = PivotConfig::from_json(r#"{"options": {"sortOrder": "descending"}}"#).unwrap();
        assert_eq!(config.options.sort_order, SortOrder::Descending);
        assert_eq!(config.options.empty_label, "(empty)");
        assert!(config.value_fields.is_empty());
    }

    #[test]
    fn test_config_json_rejects_unknown_aggregator() {
        let err = PivotConfig::from_json(r#"{"valueFields": [{"field": "x", "aggregator": "median"}]}"#)
            .unwrap_err();
        assert!(matches!(err, PivotError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = PivotConfig::new()
            .row("Region")
            .column("Quarter")
            .value("Sales", AggregatorKind::Average)
            .filter(FilterSpec::exclude("Region", ["North"]));
        let json = config.to_json().unwrap();
        assert_eq!(PivotConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_aggregator_lenient_names() {
        assert_eq!("AVG".parse::<AggregatorKind>(), Ok(AggregatorKind::Average));
        assert_eq!("count_non_empty".parse::<AggregatorKind>(), Ok(AggregatorKind::CountNonEmpty));
        assert_eq!("Count Unique".parse::<AggregatorKind>(), Ok(AggregatorKind::CountDistinct));
        assert!("median".parse::<AggregatorKind>().is_err());

        for kind in AggregatorKind::ALL {
            assert_eq!(kind.as_str().parse::<AggregatorKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_additive_aggregators() {
        let additive: Vec<AggregatorKind> =
            AggregatorKind::ALL.into_iter().filter(|kind| kind.is_additive()).collect();
        assert_eq!(
            additive,
            vec![AggregatorKind::Sum, AggregatorKind::Count, AggregatorKind::CountNonEmpty]
        );
    }

    #[test]
    fn test_value_field_labels() {
        assert_eq!(ValueFieldSpec::new("Sales", AggregatorKind::Sum).label(), "Sum of Sales");
        assert_eq!(
            ValueFieldSpec::new("Sales", AggregatorKind::Sum)
                .with_display_name("Revenue")
                .label(),
            "Revenue"
        );
    }

    #[test]
    fn test_sanitized_drops_repeated_fields() {
        let config = PivotConfig::new()
            .row("Region")
            .row("Region")
            .row("Category")
            .column("Region")
            .column("Quarter");

        let clean = config.sanitized();
        assert_eq!(clean.row_fields, vec!["Region", "Category"]);
        assert_eq!(clean.col_fields, vec!["Quarter"]);
    }

    #[test]
    fn test_filter_activity() {
        assert!(FilterSpec::include("Region", ["West"]).is_active());
        assert!(!FilterSpec::include("Region", Vec::<Scalar>::new()).is_active());
    }
}
