//! FILENAME: tests/test_widgets.rs
//! Integration tests for dashboard widgets and chart projection.

mod common;

use common::{assert_number, SalesFixture};
use pivot_engine::{
    assemble, evaluate_widget, to_chart_series, AggregatorKind, ChartKind, PivotConfig, WidgetConfig,
    WidgetData,
};
use tabular::Scalar;

fn dashboard() -> Vec<WidgetConfig> {
    serde_json::from_str(
        r#"[
            {"type": "kpi", "title": "Revenue", "field": "Sales", "aggregator": "sum"},
            {"type": "kpi", "title": "Regions", "field": "Region", "aggregator": "countDistinct",
             "filters": [{"field": "Quarter", "selectedValues": ["Q1"]}]},
            {"type": "chart", "title": "By quarter", "chartKind": "line", "groupBy": "Quarter",
             "value": {"field": "Quantity", "aggregator": "average"}},
            {"type": "table", "title": "Pivot", "pivot": {
                "rowFields": ["Region"], "colFields": ["Product"],
                "valueFields": [{"field": "Sales", "aggregator": "max"}]
            }}
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_dashboard_evaluates_every_widget() {
    let rows = SalesFixture::rows();
    let widgets = dashboard();
    let titles: Vec<&str> = widgets.iter().map(WidgetConfig::title).collect();
    assert_eq!(titles, vec!["Revenue", "Regions", "By quarter", "Pivot"]);

    let data: Vec<WidgetData> = widgets
        .iter()
        .map(|w| evaluate_widget(&rows, w).unwrap())
        .collect();

    match &data[0] {
        WidgetData::Kpi { value, formatted, .. } => {
            assert_number(value, 127500.0);
            assert_eq!(formatted, "127500");
        }
        other => panic!("expected a KPI, got {:?}", other),
    }

    match &data[1] {
        WidgetData::Kpi { value, .. } => assert_number(value, 3.0),
        other => panic!("expected a KPI, got {:?}", other),
    }

    match &data[2] {
        WidgetData::Chart { chart_kind, series, .. } => {
            assert_eq!(*chart_kind, ChartKind::Line);
            assert_eq!(series.len(), 2);
            assert_eq!(series[0].name, "Q1");
            assert_number(&series[0].value, 100.0);
            assert_number(&series[1].value, 112.5);
        }
        other => panic!("expected a chart, got {:?}", other),
    }

    match &data[3] {
        WidgetData::Table { result, .. } => {
            assert_eq!(result.row_leaves.len(), 3);
            assert_eq!(result.cell(1, 0), Some(&[Scalar::Number(15000.0)][..]));
        }
        other => panic!("expected a table, got {:?}", other),
    }
}

#[test]
fn test_chart_matches_pivot_row_order() {
    let rows = SalesFixture::rows();
    let config = PivotConfig::new()
        .row("Region")
        .column("Quarter")
        .value("Sales", AggregatorKind::Sum);
    let result = assemble(&rows, &config);
    let series = to_chart_series(&result, 0).unwrap();

    let rows_order: Vec<&str> = result.row_tree.iter().map(|g| g.name.as_str()).collect();
    let chart_order: Vec<&str> = series.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(rows_order, chart_order);

    for (point, group) in series.iter().zip(&result.row_tree) {
        assert_eq!(point.value, group.subtotal[0]);
    }
}

#[test]
fn test_widget_data_json_shape() {
    let rows = SalesFixture::rows();
    let widgets = dashboard();
    let json = serde_json::to_value(evaluate_widget(&rows, &widgets[2]).unwrap()).unwrap();

    assert_eq!(json["type"], "chart");
    assert_eq!(json["chartKind"], "line");
    assert_eq!(json["series"][1]["name"], "Q2");
}
