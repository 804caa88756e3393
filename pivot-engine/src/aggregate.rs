//! FILENAME: pivot-engine/src/aggregate.rs
//! Value coercion and aggregation.
//!
//! Aggregation is incremental: an `AggregateAccumulator` is fed one value at a
//! time and finished into a single `Scalar`. Numeric aggregators read values
//! leniently (see `Scalar::as_number`) and skip anything that does not parse.
//! An aggregation with nothing to aggregate yields `Scalar::Null`, never 0 or
//! NaN, so callers can tell "no data" from "zero".

use rustc_hash::FxHashSet;
use tabular::{Row, Scalar};

use crate::definition::{AggregatorKind, ValueFieldSpec};

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for computing one aggregate incrementally.
#[derive(Debug, Clone)]
pub struct AggregateAccumulator {
    kind: AggregatorKind,
    /// Values seen, including nulls.
    pub count: u64,
    pub count_non_empty: u64,
    /// Values that parsed as numbers.
    pub count_numbers: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Only populated for `CountDistinct`.
    distinct: FxHashSet<String>,
}

impl AggregateAccumulator {
    pub fn new(kind: AggregatorKind) -> Self {
        AggregateAccumulator {
            kind,
            count: 0,
            count_non_empty: 0,
            count_numbers: 0,
            sum: 0.0,
            min: None,
            max: None,
            distinct: FxHashSet::default(),
        }
    }

    pub fn kind(&self) -> AggregatorKind {
        self.kind
    }

    /// Adds one raw value.
    pub fn add(&mut self, value: &Scalar) {
        self.count += 1;

        if value.is_empty() {
            return;
        }
        self.count_non_empty += 1;

        match self.kind {
            AggregatorKind::CountDistinct => {
                // Non-empty values never hit the empty label.
                self.distinct.insert(value.group_label(""));
            }
            AggregatorKind::Sum
            | AggregatorKind::Average
            | AggregatorKind::Min
            | AggregatorKind::Max => {
                if let Some(n) = value.as_number() {
                    self.add_number(n);
                }
            }
            AggregatorKind::Count | AggregatorKind::CountNonEmpty => {}
        }
    }

    fn add_number(&mut self, value: f64) {
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Folds another accumulator of the same kind into this one.
    pub fn merge(&mut self, other: &AggregateAccumulator) {
        self.count += other.count;
        self.count_non_empty += other.count_non_empty;
        self.count_numbers += other.count_numbers;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.distinct.extend(other.distinct.iter().cloned());
    }

    /// Computes the final aggregate value.
    pub fn finish(&self) -> Scalar {
        if self.count == 0 {
            return Scalar::Null;
        }

        let result = match self.kind {
            AggregatorKind::Count => Some(self.count as f64),
            AggregatorKind::CountNonEmpty => Some(self.count_non_empty as f64),
            AggregatorKind::CountDistinct => Some(self.distinct.len() as f64),
            AggregatorKind::Sum => (self.count_numbers > 0).then_some(self.sum),
            AggregatorKind::Average => {
                (self.count_numbers > 0).then(|| self.sum / self.count_numbers as f64)
            }
            AggregatorKind::Min => self.min,
            AggregatorKind::Max => self.max,
        };

        // Infinity minus infinity is the only way to get here with NaN.
        match result {
            Some(n) if !n.is_nan() => Scalar::Number(n),
            _ => Scalar::Null,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Aggregates a set of raw values with one aggregator.
pub fn aggregate<'a, I>(values: I, kind: AggregatorKind) -> Scalar
where
    I: IntoIterator<Item = &'a Scalar>,
{
    let mut acc = AggregateAccumulator::new(kind);
    for value in values {
        acc.add(value);
    }
    acc.finish()
}

/// Aggregates the rows at `indices` once per value field, in spec order.
pub fn aggregate_rows(rows: &[&Row], indices: &[usize], value_fields: &[ValueFieldSpec]) -> Vec<Scalar> {
    value_fields
        .iter()
        .map(|spec| {
            aggregate(
                indices.iter().map(|&i| rows[i].get(&spec.field)),
                spec.aggregator,
            )
        })
        .collect()
}
