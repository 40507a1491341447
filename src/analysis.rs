//! Aggregation of loaded records into per-dimension rollups and overall totals.
//!
//! One linear pass accumulates sums into three independent rollups (product,
//! region, calendar month) plus global totals; a second pass derives per-group
//! averages and the overall profit margin.  The result is built once and read
//! only afterwards.

use log::debug;
use serde::Serialize;

use crate::data::Record;
use crate::error::{ReportError, Result};

/// Accumulated sums, count, and derived averages for one key value within one
/// grouping dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
    pub count: usize,
    pub avg_sales: f64,
    pub avg_profit: f64,
}

impl GroupAggregate {
    fn accumulate(&mut self, record: &Record) {
        self.sales += record.sales;
        self.expenses += record.expenses;
        self.profit += record.profit;
        self.count += 1;
    }

    fn finalize(&mut self) {
        // count >= 1 is guaranteed: groups only exist once a record hit them.
        self.avg_sales = self.sales / self.count as f64;
        self.avg_profit = self.profit / self.count as f64;
    }

    /// Profit as a percentage of sales; 0 when sales is 0.
    pub fn margin(&self) -> f64 {
        if self.sales == 0.0 {
            0.0
        } else {
            self.profit / self.sales * 100.0
        }
    }
}

/// A key-to-aggregate mapping that preserves first-seen key order.
///
/// Report tables and charts must share one canonical row order per dimension,
/// so insertion order is part of the contract.  Lookups are linear scans, which
/// is fine at human-reporting scale.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rollup {
    entries: Vec<(String, GroupAggregate)>,
}

impl Rollup {
    fn entry_mut(&mut self, key: &str) -> &mut GroupAggregate {
        if let Some(position) = self.entries.iter().position(|(k, _)| k == key) {
            return &mut self.entries[position].1;
        }
        self.entries
            .push((key.to_string(), GroupAggregate::default()));
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }

    fn finalize(&mut self) {
        for (_, aggregate) in &mut self.entries {
            aggregate.finalize();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&GroupAggregate> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, aggregate)| aggregate)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupAggregate)> {
        self.entries
            .iter()
            .map(|(key, aggregate)| (key.as_str(), aggregate))
    }

    /// Entries sorted by key.  For "YYYY-MM" month keys this is chronological.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &GroupAggregate)> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        sorted
            .into_iter()
            .map(|(key, aggregate)| (key.as_str(), aggregate))
    }

    /// The entry with the highest profit.  Ties resolve to the first group in
    /// first-seen order.
    pub fn max_profit(&self) -> Option<(&str, &GroupAggregate)> {
        let mut best: Option<&(String, GroupAggregate)> = None;
        for entry in &self.entries {
            match best {
                Some(current) if entry.1.profit <= current.1.profit => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(key, aggregate)| (key.as_str(), aggregate))
    }

    /// The entry with the lowest profit.  Ties resolve to the first group in
    /// first-seen order.
    pub fn min_profit(&self) -> Option<(&str, &GroupAggregate)> {
        let mut worst: Option<&(String, GroupAggregate)> = None;
        for entry in &self.entries {
            match worst {
                Some(current) if entry.1.profit >= current.1.profit => {}
                _ => worst = Some(entry),
            }
        }
        worst.map(|(key, aggregate)| (key.as_str(), aggregate))
    }
}

/// Dataset-wide totals and the overall profit margin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallTotals {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    /// Percentage of sales; 0 when total sales is 0.
    pub profit_margin: f64,
}

/// The complete analysis output consumed by chart rendering and document
/// composition.  Never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub overall: OverallTotals,
    pub products: Rollup,
    pub regions: Rollup,
    pub months: Rollup,
}

/// Aggregates the full record sequence into one [`AnalysisResult`].
pub fn analyze(records: &[Record]) -> Result<AnalysisResult> {
    if records.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut overall = OverallTotals::default();
    let mut products = Rollup::default();
    let mut regions = Rollup::default();
    let mut months = Rollup::default();

    for record in records {
        overall.total_sales += record.sales;
        overall.total_expenses += record.expenses;
        overall.total_profit += record.profit;

        products.entry_mut(&record.product).accumulate(record);
        regions.entry_mut(&record.region).accumulate(record);
        months.entry_mut(&record.month_key()).accumulate(record);
    }

    products.finalize();
    regions.finalize();
    months.finalize();

    if overall.total_sales != 0.0 {
        overall.profit_margin = overall.total_profit / overall.total_sales * 100.0;
    }

    debug!(
        "Analyzed {} records into {} products, {} regions, {} months",
        records.len(),
        products.len(),
        regions.len(),
        months.len()
    );

    Ok(AnalysisResult {
        overall,
        products,
        regions,
        months,
    })
}
