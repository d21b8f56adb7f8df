//! Data types shared by the aggregation and regression stages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One station-level row as read from the dataset.
///
/// Cells hold the raw text of each configured column. Interpretation (date
/// parsing, numeric conversion) happens in the aggregator, so a row with a bad
/// cell is still a valid observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    cells: HashMap<String, String>,
}

impl RawObservation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(field.into(), value.into());
    }

    /// Builder form of [`RawObservation::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Trimmed text of `field`, or `None` when absent or blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.cells
            .get(field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Numeric value of `field`.
    ///
    /// Absent, blank, non-numeric and non-finite cells (`NaN`, `inf`) are all
    /// null.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.text(field)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawObservation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut obs = RawObservation::new();
        for (k, v) in iter {
            obs.insert(k, v);
        }
        obs
    }
}

/// How observations with missing values are treated during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Drop any observation missing a tracked field before grouping.
    #[default]
    DropIncomplete,
    /// Keep partial observations; each field's mean uses its own non-null
    /// values, and dates where a field has no values at all are dropped.
    DropNullMeans,
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPolicy::DropIncomplete => f.write_str("drop-incomplete"),
            MissingPolicy::DropNullMeans => f.write_str("drop-null-means"),
        }
    }
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop-incomplete" | "strict" => Ok(MissingPolicy::DropIncomplete),
            "drop-null-means" | "lenient" => Ok(MissingPolicy::DropNullMeans),
            other => Err(format!(
                "unknown missing-value policy '{other}' (expected drop-incomplete or drop-null-means)"
            )),
        }
    }
}

/// One calendar date of the daily panel.
///
/// `values` is aligned with [`DailyPanel::fields`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Counters describing what cleaning removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub rows_read: usize,
    pub invalid_date: usize,
    pub incomplete: usize,
    pub groups: usize,
    pub null_mean_groups: usize,
}

/// The station-level panel reduced to one row per date, ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPanel {
    pub fields: Vec<String>,
    pub rows: Vec<DailyRow>,
    pub stats: AggregateStats,
}

impl DailyPanel {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All daily means of `field`, in date order.
    pub fn column(&self, field: &str) -> Option<Vec<f64>> {
        let idx = self.fields.iter().position(|f| f == field)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// First and last date of the panel.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// An OLS line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit of one dependent series against the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesFit {
    pub column: String,
    pub label: String,
    pub observations: usize,
    pub fit: LinearFit,
}
