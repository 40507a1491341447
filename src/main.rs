use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use sales_reporter::analysis::analyze;
use sales_reporter::charts::{
    render_monthly_chart, render_product_chart, write_chart, MONTHLY_CHART_FILE,
    PRODUCT_CHART_FILE,
};
use sales_reporter::data::{ensure_sample_data, load_records};
use sales_reporter::report::{compose_report, ChartImages, DEFAULT_REPORT_FILE};
use sales_reporter::Result;

/// Generates the sales performance PDF report from a CSV dataset.
///
/// On first run a sample dataset is written to the data path; an existing
/// file is never overwritten.  Fonts must be installed under `assets/fonts`
/// or provided via the `SALES_REPORTER_FONTS_DIR` environment variable.
#[derive(Parser)]
#[command(author, version, about = "Generates the sales performance PDF report")]
struct Cli {
    /// Input CSV file; created with sample data when absent.
    #[arg(long, default_value = "sales_data.csv")]
    data: PathBuf,

    /// Output PDF filename.
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    output: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    println!("Starting automated report generation...");

    if ensure_sample_data(&cli.data)? {
        println!("Sample data file '{}' created.", cli.data.display());
    } else {
        println!("Data file '{}' already exists.", cli.data.display());
    }

    println!("Reading and analyzing data...");
    let records = load_records(&cli.data)?;
    let analysis = analyze(&records)?;

    let overall = &analysis.overall;
    println!("Total Sales: ${:.2}", overall.total_sales);
    println!("Total Expenses: ${:.2}", overall.total_expenses);
    println!("Total Profit: ${:.2}", overall.total_profit);
    println!("Profit Margin: {:.2}%", overall.profit_margin);

    println!("Creating visualizations...");
    let charts = ChartImages {
        product_chart: render_product_chart(&analysis)?,
        monthly_chart: render_monthly_chart(&analysis)?,
    };

    // Chart artifacts land next to the report.
    let artifact_dir = match cli.output.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let product_chart_path = artifact_dir.join(PRODUCT_CHART_FILE);
    let monthly_chart_path = artifact_dir.join(MONTHLY_CHART_FILE);
    write_chart(&charts.product_chart, &product_chart_path)?;
    write_chart(&charts.monthly_chart, &monthly_chart_path)?;

    println!("Generating PDF report...");
    compose_report(&analysis, &charts, &cli.output)?;

    println!("\nGenerated Files:");
    println!("1. Data file: {}", absolute(&cli.data)?.display());
    println!(
        "2. Product performance chart: {}",
        absolute(&product_chart_path)?.display()
    );
    println!(
        "3. Monthly trend chart: {}",
        absolute(&monthly_chart_path)?.display()
    );
    println!("4. PDF report: {}", absolute(&cli.output)?.display());

    println!("\nReport generation completed successfully!");
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(fs::canonicalize(path)?)
}

fn print_error_sources(error: &dyn Error) {
    let mut current = error.source();
    while let Some(source) = current {
        eprintln!("  caused by: {}", source);
        current = source.source();
    }
}
