//! Run configuration.
//!
//! A [`PipelineConfig`] carries everything a run needs: where the panel lives,
//! where the chart data goes, and which columns hold the date, the benchmark
//! and the retail series. It can be stored as a JSON file on disk:
//!
//! ```json
//! {
//!   "dataset_path": "data/panel_prices_brent.csv.gz",
//!   "output_path": "plots/pass_through.csv",
//!   "columns": {
//!     "date": "date",
//!     "benchmark": { "column": "Brent_EUR_per_Litre", "label": "Brent" },
//!     "dependents": [
//!       { "column": "diesel", "label": "Diesel" },
//!       { "column": "e5", "label": "E5" }
//!     ]
//!   },
//!   "missing_policy": "drop-incomplete"
//! }
//! ```
//!
//! Keys left out take their defaults.

use crate::analyzers::sampler::DEFAULT_LINE_SAMPLES;
use crate::analyzers::types::MissingPolicy;
use crate::error::{PassThroughError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A price column and the name it is shown under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub column: String,
    pub label: String,
}

impl SeriesColumn {
    pub fn new(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
        }
    }
}

/// Column names of the input panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub date: String,
    pub benchmark: SeriesColumn,
    pub dependents: Vec<SeriesColumn>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            benchmark: SeriesColumn::new("Brent_EUR_per_Litre", "Brent"),
            dependents: vec![
                SeriesColumn::new("diesel", "Diesel"),
                SeriesColumn::new("e5", "E5"),
            ],
        }
    }
}

impl ColumnConfig {
    /// Numeric columns tracked by the aggregator: dependents first, then the
    /// benchmark.
    pub fn value_fields(&self) -> Vec<String> {
        self.dependents
            .iter()
            .map(|d| d.column.clone())
            .chain(std::iter::once(self.benchmark.column.clone()))
            .collect()
    }

    /// Every column the loader must find in the header.
    pub fn required(&self) -> Vec<String> {
        std::iter::once(self.date.clone())
            .chain(self.value_fields())
            .collect()
    }

    /// `(column, label)` pairs for the regression stage.
    pub fn dependent_pairs(&self) -> Vec<(String, String)> {
        self.dependents
            .iter()
            .map(|d| (d.column.clone(), d.label.clone()))
            .collect()
    }
}

/// Everything a single run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset_path: PathBuf,
    pub output_path: PathBuf,
    pub columns: ColumnConfig,
    pub missing_policy: MissingPolicy,
    pub line_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/panel_prices_brent.csv"),
            output_path: PathBuf::from("plots/long_run_pass_through.csv"),
            columns: ColumnConfig::default(),
            missing_policy: MissingPolicy::default(),
            line_samples: DEFAULT_LINE_SAMPLES,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Rejects configurations no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.columns.dependents.is_empty() {
            return Err(PassThroughError::Config(
                "at least one dependent series is required".into(),
            ));
        }

        let required = self.columns.required();
        if let Some(blank) = required.iter().find(|c| c.trim().is_empty()) {
            return Err(PassThroughError::Config(format!(
                "column names must not be blank (got '{blank}')"
            )));
        }

        let mut seen = HashSet::new();
        for column in &required {
            if !seen.insert(column.as_str()) {
                return Err(PassThroughError::Config(format!(
                    "column '{column}' is configured more than once"
                )));
            }
        }

        if self.line_samples < 2 {
            return Err(PassThroughError::Config(format!(
                "line_samples must be at least 2, got {}",
                self.line_samples
            )));
        }

        Ok(())
    }
}
