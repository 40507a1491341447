//! Record loading and first-run sample data bootstrap.
//!
//! The loader turns a delimited text file with a fixed `Date,Product,Region,
//! Sales,Expenses` header into typed [`Record`] values, preserving input row
//! order.  Any malformed row aborts the whole load; there are no partial
//! results.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Column names the input header must contain, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Product", "Region", "Sales", "Expenses"];

/// The date format accepted in the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single sales record.  Immutable once loaded; `profit` is derived at load
/// time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub product: String,
    pub region: String,
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl Record {
    /// The record's grouping key for the time dimension, truncated to
    /// year-month granularity.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// Loads every record from the CSV file at `path`, in input order.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| ReportError::MissingColumn(column.to_string()))?;
    }
    let [date_idx, product_idx, region_idx, sales_idx, expenses_idx] = indices;

    let mut records = Vec::new();
    for (offset, row) in reader.records().enumerate() {
        let row = row?;
        // 1-based position of the data row, excluding the header.
        let row_number = offset + 1;

        let field = |idx: usize| row.get(idx).unwrap_or_default();

        let date =
            NaiveDate::parse_from_str(field(date_idx), DATE_FORMAT).map_err(|source| {
                ReportError::InvalidDate {
                    row: row_number,
                    value: field(date_idx).to_string(),
                    source,
                }
            })?;
        let sales = parse_amount(field(sales_idx), row_number, "Sales")?;
        let expenses = parse_amount(field(expenses_idx), row_number, "Expenses")?;

        records.push(Record {
            date,
            product: field(product_idx).to_string(),
            region: field(region_idx).to_string(),
            sales,
            expenses,
            profit: sales - expenses,
        });
    }

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn parse_amount(value: &str, row: usize, column: &'static str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ReportError::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// The built-in sample dataset: 3 products x 2 regions x 3 months.
pub const SAMPLE_DATA: &str = "\
Date,Product,Region,Sales,Expenses
2023-01-01,Product A,North,5000,3000
2023-01-01,Product B,North,4500,2800
2023-01-01,Product C,North,6000,3500
2023-01-01,Product A,South,5500,3200
2023-01-01,Product B,South,4800,2900
2023-01-01,Product C,South,6200,3800
2023-02-01,Product A,North,5200,3100
2023-02-01,Product B,North,4700,2850
2023-02-01,Product C,North,6100,3600
2023-02-01,Product A,South,5600,3300
2023-02-01,Product B,South,4900,2950
2023-02-01,Product C,South,6300,3900
2023-03-01,Product A,North,5300,3150
2023-03-01,Product B,North,4800,2900
2023-03-01,Product C,North,6200,3650
2023-03-01,Product A,South,5700,3350
2023-03-01,Product B,South,5000,3000
2023-03-01,Product C,South,6400,3950
";

/// Writes the sample dataset to `path` unless a file already exists there.
///
/// Never overwrites; returns `true` when the sample was written.
pub fn ensure_sample_data(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        info!("Data file '{}' already exists", path.display());
        return Ok(false);
    }

    fs::write(path, SAMPLE_DATA).map_err(|source| ReportError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Sample data file '{}' created", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        file
    }

    #[test]
    fn loads_sample_data_in_order() {
        let file = write_temp_csv(SAMPLE_DATA);
        let records = load_records(file.path()).expect("load sample data");

        assert_eq!(records.len(), 18);
        assert_eq!(records[0].product, "Product A");
        assert_eq!(records[0].region, "North");
        assert_eq!(records[0].profit, 2000.0);
        assert_eq!(records[17].month_key(), "2023-03");
    }

    #[test]
    fn missing_file_is_a_data_error() {
        let err = load_records("no_such_file.csv").unwrap_err();
        assert!(matches!(err, ReportError::MissingInput(_)));
    }

    #[test]
    fn missing_sales_column_fails() {
        let file = write_temp_csv("Date,Product,Region,Expenses\n2023-01-01,A,North,10\n");
        let err = load_records(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn(ref col) if col == "Sales"));
    }

    #[test]
    fn bad_date_reports_the_row() {
        let file = write_temp_csv(
            "Date,Product,Region,Sales,Expenses\n\
             2023-01-01,A,North,10,5\n\
             01/02/2023,B,South,20,8\n",
        );
        match load_records(file.path()).unwrap_err() {
            ReportError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "01/02/2023");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let file = write_temp_csv(
            "Date,Product,Region,Sales,Expenses\n2023-01-01,A,North,ten,5\n",
        );
        match load_records(file.path()).unwrap_err() {
            ReportError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Sales");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bootstrap_never_overwrites() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("sales_data.csv");

        std::fs::write(&path, "custom contents").expect("seed file");
        let wrote = ensure_sample_data(&path).expect("bootstrap");
        assert!(!wrote);
        assert_eq!(
            std::fs::read_to_string(&path).expect("read back"),
            "custom contents"
        );
    }

    #[test]
    fn bootstrap_creates_sample_when_absent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("sales_data.csv");

        let wrote = ensure_sample_data(&path).expect("bootstrap");
        assert!(wrote);
        let records = load_records(&path).expect("load bootstrap output");
        assert_eq!(records.len(), 18);
    }
}
