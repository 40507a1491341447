//! Sales report generation pipeline.
//!
//! Loads delimited sales records, aggregates them into per-product,
//! per-region, and per-month rollups, renders two chart images, and composes
//! a paginated PDF report.  The whole pipeline is synchronous and
//! single-pass; see the module docs for each stage.

pub mod analysis;
pub mod builder;
pub mod charts;
pub mod data;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod report;

pub use analysis::{analyze, AnalysisResult, GroupAggregate, OverallTotals, Rollup};
pub use data::{ensure_sample_data, load_records, Record};
pub use error::{ReportError, Result};
