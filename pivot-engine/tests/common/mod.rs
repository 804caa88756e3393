//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pivot-engine integration tests.

#![allow(dead_code)]

use pivot_engine::{CrossTabResult, HeaderGroup};
use tabular::{Row, Scalar};

// ============================================================================
// FIXTURES
// ============================================================================

/// Sales data suitable for pivot tables.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["Region", "Product", "Quarter", "Sales", "Quantity"]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 10000.0, 100.0),
            ("North", "Widget", "Q2", 12000.0, 120.0),
            ("North", "Gadget", "Q1", 8000.0, 80.0),
            ("North", "Gadget", "Q2", 9000.0, 90.0),
            ("South", "Widget", "Q1", 15000.0, 150.0),
            ("South", "Widget", "Q2", 14000.0, 140.0),
            ("South", "Gadget", "Q1", 11000.0, 110.0),
            ("South", "Gadget", "Q2", 13000.0, 130.0),
            ("East", "Widget", "Q1", 9000.0, 90.0),
            ("East", "Widget", "Q2", 11000.0, 110.0),
            ("East", "Gadget", "Q1", 7000.0, 70.0),
            ("East", "Gadget", "Q2", 8500.0, 85.0),
        ]
    }

    pub fn rows() -> Vec<Row> {
        Self::data()
            .into_iter()
            .map(|(region, product, quarter, sales, quantity)| {
                Row::new()
                    .with("Region", region)
                    .with("Product", product)
                    .with("Quarter", quarter)
                    .with("Sales", sales)
                    .with("Quantity", quantity)
            })
            .collect()
    }
}

/// The three-row West/East table used by the headline scenarios.
pub fn west_east_rows() -> Vec<Row> {
    vec![
        Row::new().with("Region", "West").with("Sales", 10),
        Row::new().with("Region", "West").with("Sales", 20),
        Row::new().with("Region", "East").with("Sales", 5),
    ]
}

pub fn path(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a scalar is a number close to `expected`.
pub fn assert_number(value: &Scalar, expected: f64) {
    match value {
        Scalar::Number(n) => {
            assert!(
                (n - expected).abs() < 0.001,
                "expected {} but got {}",
                expected,
                n
            );
        }
        other => panic!("expected Number({}) but got {:?}", expected, other),
    }
}

/// Assert the first value of a row subtotal.
pub fn assert_row_subtotal(result: &CrossTabResult, row_path: &[&str], expected: f64) {
    let subtotal = result
        .row_subtotal(&path(row_path))
        .unwrap_or_else(|| panic!("no row subtotal for {:?}", row_path));
    assert_number(&subtotal[0], expected);
}

pub fn names(groups: &[HeaderGroup]) -> Vec<&str> {
    groups.iter().map(|g| g.name.as_str()).collect()
}

/// Sums the row counts of every leaf bucket implied by the tree.
pub fn leaf_row_total(groups: &[HeaderGroup]) -> usize {
    pivot_engine::keys::leaves(groups).iter().map(|g| g.row_count).sum()
}
