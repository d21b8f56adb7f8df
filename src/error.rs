use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pass-through pipeline.
#[derive(Error, Debug)]
pub enum PassThroughError {
    /// The input path does not resolve to a readable file.
    #[error("Dataset not found at {0}")]
    DatasetNotFound(PathBuf),

    /// No daily rows survived cleaning.
    #[error(
        "Daily panel is empty after cleaning ({rows_read} rows read); check column names and missing values"
    )]
    EmptyResult { rows_read: usize },

    /// Regression input cannot define a line.
    #[error("Degenerate regression input for {series}: {reason}")]
    DegenerateInput { series: String, reason: String },

    /// A configured column is absent from the dataset header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] polars::prelude::PolarsError),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PassThroughError {
    pub(crate) fn degenerate(series: &str, reason: impl Into<String>) -> Self {
        PassThroughError::DegenerateInput {
            series: series.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PassThroughError>;
