//! FILENAME: pivot-engine/benches/pivot_calculations.rs
//! Cross-tab assembly benchmarks over generated sales tables.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pivot_engine::{assemble, build_key_tree, filter_rows, AggregatorKind, FilterSpec, PivotConfig, PivotOptions};
use tabular::Row;

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const PRODUCTS: [&str; 8] = ["Widget", "Gadget", "Gizmo", "Doohickey", "Sprocket", "Cog", "Lever", "Spring"];

/// Deterministic table with a few nulls and unparseable values mixed in.
fn generate_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let mut row = Row::new()
                .with("Region", REGIONS[i % REGIONS.len()])
                .with("Product", PRODUCTS[(i / 3) % PRODUCTS.len()])
                .with("Year", 2020 + (i % 4) as i32)
                .with("Quarter", format!("Q{}", (i / 7) % 4 + 1))
                .with("Quantity", (i % 50) as i32);
            if i % 97 != 0 {
                row.insert("Sales", ((i * 37) % 1000) as f64 * 1.25);
            } else if i % 2 == 0 {
                row.insert("Sales", "n/a");
            }
            row
        })
        .collect()
}

// ============================================================================
// Assembly Benchmarks
// ============================================================================

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let config = PivotConfig::new()
        .row("Region")
        .row("Product")
        .column("Year")
        .column("Quarter")
        .value("Sales", AggregatorKind::Sum)
        .value("Sales", AggregatorKind::Average)
        .value("Quantity", AggregatorKind::Max);

    for size in [1_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(size as u64));
        let rows = generate_rows(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| black_box(assemble(black_box(rows), &config)));
        });
    }

    group.finish();
}

fn bench_assemble_filtered(c: &mut Criterion) {
    let rows = generate_rows(50_000);
    let config = PivotConfig::new()
        .row("Product")
        .column("Region")
        .value("Sales", AggregatorKind::CountDistinct)
        .filter(FilterSpec::include("Year", [2021, 2023]))
        .filter(FilterSpec::exclude("Region", ["Central"]));

    c.bench_function("assemble_filtered_50k", |b| {
        b.iter(|| black_box(assemble(black_box(&rows), &config)));
    });
}

// ============================================================================
// Component Benchmarks
// ============================================================================

fn bench_key_tree(c: &mut Criterion) {
    let rows = generate_rows(50_000);
    let refs: Vec<&Row> = rows.iter().collect();
    let fields = vec!["Region".to_string(), "Product".to_string(), "Quarter".to_string()];
    let options = PivotOptions::default();

    c.bench_function("build_key_tree_50k", |b| {
        b.iter(|| black_box(build_key_tree(black_box(&refs), &fields, &options)));
    });
}

fn bench_filter(c: &mut Criterion) {
    let rows = generate_rows(50_000);
    let filters = vec![FilterSpec::include("Region", ["North", "West"])];

    c.bench_function("filter_rows_50k", |b| {
        b.iter(|| black_box(filter_rows(black_box(&rows), &filters).len()));
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    pivot_benches,
    bench_assemble,
    bench_assemble_filtered,
    bench_key_tree,
    bench_filter
);

criterion_main!(pivot_benches);
