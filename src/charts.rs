//! Procedural chart rasterization.
//!
//! Charts are drawn pixel-by-pixel into an [`image::RgbImage`] and encoded as
//! PNG bytes.  Category and series names are not rasterized into the bitmap;
//! they appear in the caption and table that accompany each chart in the
//! document, which share the chart's row order.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use log::debug;

use crate::analysis::AnalysisResult;
use crate::error::{ReportError, Result};

/// Fixed artifact name for the grouped product bar chart.
pub const PRODUCT_CHART_FILE: &str = "product_performance.png";
/// Fixed artifact name for the monthly trend line chart.
pub const MONTHLY_CHART_FILE: &str = "monthly_trend.png";

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 600;

const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 60;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([90, 90, 90]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const SALES_COLOR: Rgb<u8> = Rgb([54, 98, 160]);
const PROFIT_COLOR: Rgb<u8> = Rgb([64, 145, 88]);

/// Renders the grouped bar chart: one (sales, profit) bar pair per product,
/// in first-seen product order.
pub fn render_product_chart(analysis: &AnalysisResult) -> Result<Vec<u8>> {
    if analysis.products.is_empty() {
        return Err(ReportError::EmptyDimension("product"));
    }

    let series: Vec<(f64, f64)> = analysis
        .products
        .iter()
        .map(|(_, group)| (group.sales, group.profit))
        .collect();

    let mut canvas = Canvas::new(value_range(
        series.iter().flat_map(|&(sales, profit)| [sales, profit]),
    ));

    let plot_width = canvas.plot_right - canvas.plot_left;
    let slot = plot_width as f64 / series.len() as f64;
    let bar_width = (slot * 0.3).max(1.0) as u32;

    for (index, &(sales, profit)) in series.iter().enumerate() {
        let center = canvas.plot_left + (slot * (index as f64 + 0.5)) as u32;
        canvas.draw_bar(center.saturating_sub(bar_width), bar_width, sales, SALES_COLOR);
        canvas.draw_bar(center + 1, bar_width, profit, PROFIT_COLOR);
    }

    canvas.draw_frame_and_legend();
    canvas.encode()
}

/// Renders the line trend chart: one vertex per month per metric (sales,
/// profit), in chronological month order.
pub fn render_monthly_chart(analysis: &AnalysisResult) -> Result<Vec<u8>> {
    if analysis.months.is_empty() {
        return Err(ReportError::EmptyDimension("month"));
    }

    let series: Vec<(f64, f64)> = analysis
        .months
        .iter_sorted()
        .map(|(_, group)| (group.sales, group.profit))
        .collect();

    let mut canvas = Canvas::new(value_range(
        series.iter().flat_map(|&(sales, profit)| [sales, profit]),
    ));

    let plot_left = canvas.plot_left;
    let plot_width = canvas.plot_right - plot_left;
    let point_count = series.len();
    let step = if point_count > 1 {
        plot_width as f64 / (point_count - 1) as f64
    } else {
        0.0
    };
    let x_at = move |index: usize| {
        if point_count > 1 {
            plot_left + (step * index as f64) as u32
        } else {
            plot_left + plot_width / 2
        }
    };

    for window in 0..series.len().saturating_sub(1) {
        let (x0, x1) = (x_at(window), x_at(window + 1));
        canvas.draw_segment(x0, series[window].0, x1, series[window + 1].0, SALES_COLOR);
        canvas.draw_segment(x0, series[window].1, x1, series[window + 1].1, PROFIT_COLOR);
    }
    for (index, &(sales, profit)) in series.iter().enumerate() {
        canvas.draw_marker(x_at(index), sales, SALES_COLOR);
        canvas.draw_marker(x_at(index), profit, PROFIT_COLOR);
    }

    canvas.draw_frame_and_legend();
    canvas.encode()
}

/// Persists rendered chart bytes at `path`.
pub fn write_chart(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|source| ReportError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote chart {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// The value range spanned by the vertical axis.  Always includes zero so
/// bars have a meaningful baseline; pads the top and bottom by 5%.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min == max {
        // Degenerate all-zero data still needs a non-empty axis.
        max = 1.0;
    }
    let pad = (max - min) * 0.05;
    (min - if min < 0.0 { pad } else { 0.0 }, max + pad)
}

struct Canvas {
    pixels: RgbImage,
    plot_left: u32,
    plot_right: u32,
    plot_top: u32,
    plot_bottom: u32,
    min_value: f64,
    max_value: f64,
}

impl Canvas {
    fn new((min_value, max_value): (f64, f64)) -> Self {
        let mut pixels = RgbImage::new(CHART_WIDTH, CHART_HEIGHT);
        for pixel in pixels.pixels_mut() {
            *pixel = BACKGROUND;
        }

        Self {
            pixels,
            plot_left: MARGIN_LEFT,
            plot_right: CHART_WIDTH - MARGIN_RIGHT,
            plot_top: MARGIN_TOP,
            plot_bottom: CHART_HEIGHT - MARGIN_BOTTOM,
            min_value,
            max_value,
        }
    }

    /// Maps a data value onto a y pixel coordinate within the plot area.
    fn y_at(&self, value: f64) -> u32 {
        let span = self.max_value - self.min_value;
        let fraction = ((value - self.min_value) / span).clamp(0.0, 1.0);
        let height = (self.plot_bottom - self.plot_top) as f64;
        self.plot_bottom - (fraction * height).round() as u32
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        if x < CHART_WIDTH && y < CHART_HEIGHT {
            self.pixels.put_pixel(x, y, color);
        }
    }

    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.put(x, y, color);
            }
        }
    }

    /// Draws a vertical bar from the zero baseline to `value`.
    fn draw_bar(&mut self, left: u32, width: u32, value: f64, color: Rgb<u8>) {
        let baseline = self.y_at(0.0);
        let top = self.y_at(value);
        let left = left.max(self.plot_left);
        let right = (left + width).min(self.plot_right);
        self.fill_rect(left, top.min(baseline), right, top.max(baseline), color);
    }

    /// Draws a line segment between two data points.
    fn draw_segment(&mut self, x0: u32, v0: f64, x1: u32, v1: f64, color: Rgb<u8>) {
        let (y0, y1) = (self.y_at(v0) as i64, self.y_at(v1) as i64);
        let (x0, x1) = (x0 as i64, x1 as i64);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = (x0 as f64 + (x1 - x0) as f64 * t).round() as i64;
            let y = (y0 as f64 + (y1 - y0) as f64 * t).round() as i64;
            // Thicken the stroke vertically for visibility.
            for dy in -1..=1 {
                if x >= 0 && y + dy >= 0 {
                    self.put(x as u32, (y + dy) as u32, color);
                }
            }
        }
    }

    /// Draws a square data-point marker centered on the value.
    fn draw_marker(&mut self, x: u32, value: f64, color: Rgb<u8>) {
        let y = self.y_at(value);
        self.fill_rect(
            x.saturating_sub(4),
            y.saturating_sub(4),
            x + 4,
            y + 4,
            color,
        );
    }

    /// Draws gridlines, the axis frame, the zero baseline, and the two legend
    /// swatches in the top-right corner.
    fn draw_frame_and_legend(&mut self) {
        for line in 1..5 {
            let y = self.plot_top + (self.plot_bottom - self.plot_top) * line / 5;
            self.fill_rect(self.plot_left, y, self.plot_right, y, GRID);
        }

        self.fill_rect(self.plot_left, self.plot_top, self.plot_left, self.plot_bottom, FRAME);
        self.fill_rect(self.plot_right, self.plot_top, self.plot_right, self.plot_bottom, FRAME);
        self.fill_rect(self.plot_left, self.plot_top, self.plot_right, self.plot_top, FRAME);
        self.fill_rect(self.plot_left, self.plot_bottom, self.plot_right, self.plot_bottom, FRAME);

        if self.min_value < 0.0 {
            let baseline = self.y_at(0.0);
            self.fill_rect(self.plot_left, baseline, self.plot_right, baseline, FRAME);
        }

        let legend_x = self.plot_right - 60;
        self.fill_rect(legend_x, 15, legend_x + 24, 27, SALES_COLOR);
        self.fill_rect(legend_x + 32, 15, legend_x + 56, 27, PROFIT_COLOR);
    }

    fn encode(self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(self.pixels)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}
