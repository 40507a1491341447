//! End-to-end pipeline tests over the bundled sample dataset, exercising the
//! bootstrap, loader, aggregator, and chart renderer without the PDF backend.

use sales_reporter::analysis::analyze;
use sales_reporter::charts::{
    render_monthly_chart, render_product_chart, write_chart, CHART_HEIGHT, CHART_WIDTH,
};
use sales_reporter::data::{ensure_sample_data, load_records};
use sales_reporter::ReportError;

use image::GenericImageView;

#[test]
fn sample_dataset_round_trips_through_the_pipeline() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_path = dir.path().join("sales_data.csv");

    assert!(ensure_sample_data(&data_path).expect("bootstrap sample data"));
    let records = load_records(&data_path).expect("load records");
    assert_eq!(records.len(), 18);

    let analysis = analyze(&records).expect("analyze records");

    assert!((analysis.overall.total_sales - 98_200.0).abs() < 1e-9);
    assert!((analysis.overall.total_expenses - 58_900.0).abs() < 1e-9);
    assert!((analysis.overall.total_profit - 39_300.0).abs() < 1e-9);

    // Per-dimension sales must sum to the overall total.
    for rollup in [&analysis.products, &analysis.regions, &analysis.months] {
        let sum: f64 = rollup.iter().map(|(_, group)| group.sales).sum();
        assert!((sum - analysis.overall.total_sales).abs() < 1e-9);
    }

    // Three products, two regions, three months.
    assert_eq!(analysis.products.len(), 3);
    assert_eq!(analysis.regions.len(), 2);
    assert_eq!(analysis.months.len(), 3);

    let product_chart = render_product_chart(&analysis).expect("render bar chart");
    let monthly_chart = render_monthly_chart(&analysis).expect("render line chart");

    let product_path = dir.path().join("product_performance.png");
    let monthly_path = dir.path().join("monthly_trend.png");
    write_chart(&product_chart, &product_path).expect("write bar chart");
    write_chart(&monthly_chart, &monthly_path).expect("write line chart");

    for path in [&product_path, &monthly_path] {
        let decoded = image::open(path).expect("decode written chart");
        assert_eq!(decoded.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
    }
}

#[test]
fn rerunning_the_bootstrap_leaves_the_dataset_untouched() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_path = dir.path().join("sales_data.csv");

    assert!(ensure_sample_data(&data_path).expect("first bootstrap"));
    let original = std::fs::read(&data_path).expect("read dataset");

    assert!(!ensure_sample_data(&data_path).expect("second bootstrap"));
    assert_eq!(std::fs::read(&data_path).expect("re-read dataset"), original);
}

#[test]
fn loading_a_missing_file_fails_fast() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = load_records(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, ReportError::MissingInput(_)));
}
