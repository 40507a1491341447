//! Error taxonomy for the report generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Data file not found: {0}")]
    MissingInput(PathBuf),

    #[error("Missing required column '{0}' in input header")]
    MissingColumn(String),

    #[error("Row {row}: invalid date '{value}': {source}")]
    InvalidDate {
        row: usize,
        value: String,
        source: chrono::ParseError,
    },

    #[error("Row {row}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Malformed input row: {0}")]
    MalformedRow(#[from] csv::Error),

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("Nothing to render: no {0} groups in the analysis")]
    EmptyDimension(&'static str),

    #[error("Chart rendering failed: {0}")]
    Render(#[from] image::ImageError),

    #[error("Failed to write {path}: {source}")]
    WriteArtifact {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Document rendering failed: {0}")]
    Document(#[from] genpdf::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
