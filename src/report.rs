//! Document composition: assembles the analysis and chart artifacts into the
//! fixed six-section PDF report.
//!
//! Section order is part of the contract: title page with the executive
//! summary, then product performance, regional performance, monthly trend,
//! and the conclusion, each of the last four starting on a new page.  Every
//! table shares its row order with the chart it accompanies.

use std::path::Path;

use chrono::Local;
use genpdf::elements::{Break, FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Element};
use log::info;

use crate::analysis::{AnalysisResult, GroupAggregate};
use crate::builder::ReportDocumentBuilder;
use crate::elements::CaptionedImage;
use crate::error::{ReportError, Result};

/// Default output filename for the composed report.
pub const DEFAULT_REPORT_FILE: &str = "sales_report.pdf";

const REPORT_TITLE: &str = "Sales Performance Report";
const TITLE_FONT_SIZE: u8 = 16;
const SECTION_FONT_SIZE: u8 = 13;
const CHART_WIDTH_MM: f64 = 170.0;

/// Rendered chart images to embed, as PNG bytes.
pub struct ChartImages {
    pub product_chart: Vec<u8>,
    pub monthly_chart: Vec<u8>,
}

/// Composes the report and writes it to `output`.
pub fn compose_report(
    analysis: &AnalysisResult,
    charts: &ChartImages,
    output: impl AsRef<Path>,
) -> Result<()> {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let document = compose_document(analysis, charts, &generated_at)?;

    let output = output.as_ref();
    document.render_to_file(output)?;
    info!("Report written to {}", output.display());
    Ok(())
}

/// Builds the full document without serializing it.  Split out so tests can
/// render with a fixed timestamp.
pub fn compose_document(
    analysis: &AnalysisResult,
    charts: &ChartImages,
    generated_at: &str,
) -> Result<genpdf::Document> {
    // Validate before touching the PDF backend: an empty section must fail
    // rather than silently emit an empty chart or table.
    for (rollup, name) in [
        (&analysis.products, "product"),
        (&analysis.regions, "region"),
        (&analysis.months, "month"),
    ] {
        if rollup.is_empty() {
            return Err(ReportError::EmptyDimension(name));
        }
    }

    let mut document = ReportDocumentBuilder::new(REPORT_TITLE).build()?;

    // Section 1: title and generation timestamp.
    document.push(centered(
        "Sales Performance Analysis Report",
        Style::new().bold().with_font_size(TITLE_FONT_SIZE),
    ));
    document.push(Break::new(1));
    document.push(centered(
        format!("Generated on: {generated_at}"),
        Style::new().italic(),
    ));
    document.push(Break::new(2));

    // Section 2: executive summary.
    push_section_title(&mut document, "Executive Summary");
    document.push(Paragraph::new(
        "This report provides an analysis of sales performance across different products and regions.",
    ));
    document.push(Break::new(1));
    let overall = &analysis.overall;
    for line in [
        format!("Total Sales: {}", format_currency(overall.total_sales)),
        format!("Total Expenses: {}", format_currency(overall.total_expenses)),
        format!("Total Profit: {}", format_currency(overall.total_profit)),
        format!("Profit Margin: {}", format_percent(overall.profit_margin)),
    ] {
        document.push(Paragraph::new(line));
    }

    // Section 3: product performance, chart then table in the same order.
    document.push(PageBreak::new());
    push_section_title(&mut document, "Product Performance");
    document.push(
        CaptionedImage::from_bytes(
            &charts.product_chart,
            "Figure 1: Sales (blue) and profit (green) by product, in table order",
        )?
        .with_width_mm(CHART_WIDTH_MM),
    );
    document.push(Break::new(1));
    document.push(breakdown_table("Product", analysis.products.iter())?);

    // Section 4: regional performance, table only.
    document.push(PageBreak::new());
    push_section_title(&mut document, "Regional Performance");
    document.push(breakdown_table("Region", analysis.regions.iter())?);

    // Section 5: monthly trend, chronological.
    document.push(PageBreak::new());
    push_section_title(&mut document, "Monthly Trend Analysis");
    document.push(
        CaptionedImage::from_bytes(
            &charts.monthly_chart,
            "Figure 2: Monthly sales (blue) and profit (green) trend",
        )?
        .with_width_mm(CHART_WIDTH_MM),
    );
    document.push(Break::new(1));
    document.push(breakdown_table("Month", analysis.months.iter_sorted())?);

    // Section 6: conclusion and recommendations.
    document.push(PageBreak::new());
    push_section_title(&mut document, "Conclusion and Recommendations");
    for line in conclusion_lines(analysis)? {
        document.push(Paragraph::new(line));
        document.push(Break::new(1));
    }

    Ok(document)
}

fn centered(text: impl Into<String>, style: Style) -> impl Element {
    let mut paragraph = Paragraph::new(text.into());
    paragraph.set_alignment(Alignment::Center);
    paragraph.styled(style)
}

fn push_section_title(document: &mut genpdf::Document, title: &str) {
    document.push(
        Paragraph::new(title).styled(Style::new().bold().with_font_size(SECTION_FONT_SIZE)),
    );
    document.push(Break::new(1));
}

/// Builds the five-column breakdown table shared by sections 3-5.
fn breakdown_table<'a>(
    key_header: &str,
    rows: impl Iterator<Item = (&'a str, &'a GroupAggregate)>,
) -> Result<TableLayout> {
    let mut table = TableLayout::new(vec![2, 2, 2, 2, 2]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let header_style = Style::new().bold();
    let mut header = table.row();
    for title in [key_header, "Sales", "Expenses", "Profit", "Margin (%)"] {
        header.push_element(Paragraph::new(title).styled(header_style).padded(1));
    }
    header.push()?;

    for (key, group) in rows {
        let mut row = table.row();
        row.push_element(Paragraph::new(key).padded(1));
        for value in [group.sales, group.expenses, group.profit] {
            row.push_element(Paragraph::new(format_currency(value)).padded(1));
        }
        row.push_element(Paragraph::new(format_percent(group.margin())).padded(1));
        row.push()?;
    }

    Ok(table)
}

fn conclusion_lines(analysis: &AnalysisResult) -> Result<Vec<String>> {
    // Ties resolve to the first group in first-seen order.
    let (best_product, best) = analysis
        .products
        .max_profit()
        .ok_or(ReportError::EmptyDimension("product"))?;
    let (worst_product, worst) = analysis
        .products
        .min_profit()
        .ok_or(ReportError::EmptyDimension("product"))?;
    let (best_region, best_region_agg) = analysis
        .regions
        .max_profit()
        .ok_or(ReportError::EmptyDimension("region"))?;
    let margin = analysis.overall.profit_margin;

    Ok(vec![
        "Based on the analysis of the sales data:".to_string(),
        format!(
            "1. The best performing product is {} with a profit of {}.",
            best_product,
            format_currency(best.profit)
        ),
        format!(
            "2. The product needing improvement is {} with a profit of {}.",
            worst_product,
            format_currency(worst.profit)
        ),
        format!(
            "3. The best performing region is {} with a profit of {}.",
            best_region,
            format_currency(best_region_agg.profit)
        ),
        format!(
            "4. The overall profit margin is {}, which is {}.",
            format_percent(margin),
            margin_judgment(margin)
        ),
        "Recommendations:".to_string(),
        format!(
            "- Focus marketing efforts on {best_product} as it is the most profitable product."
        ),
        format!(
            "- Investigate reasons for lower performance of {worst_product} and develop improvement strategies."
        ),
        format!(
            "- Expand operations in the {best_region} region as it shows the highest profitability."
        ),
        "- Consider cost reduction strategies if the profit margin remains below target.".to_string(),
    ])
}

/// Canned qualitative judgment of the overall margin.
fn margin_judgment(margin: f64) -> &'static str {
    if margin > 20.0 {
        "good"
    } else if margin > 10.0 {
        "satisfactory"
    } else {
        "needs improvement"
    }
}

/// Formats an amount as currency with a thousands separator, e.g. `$1,234.50`.
fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}
