//! Presentation of pipeline results.
//!
//! Formats regression equations and chart labels, and writes the per-run
//! chart data file that a renderer turns into the final figure.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::sampler::{sample_line, x_range};
use crate::analyzers::types::{DailyPanel, SeriesFit};
use crate::pipeline::PassThroughReport;

/// Whether a chart row is an observed daily mean or a point on a fitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Point,
    Fit,
}

/// One row of the regression chart data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub series: String,
    pub kind: PointKind,
    pub x: f64,
    pub y: f64,
}

/// Console form of a fitted equation, coefficients to 4 decimal places.
pub fn format_equation(fit: &SeriesFit, benchmark_label: &str) -> String {
    format!(
        "{}: price_{} = {:.4} + {:.4} · {}",
        fit.label, fit.column, fit.fit.intercept, fit.fit.slope, benchmark_label
    )
}

/// Legend label for a fitted line, coefficients to 2 decimal places.
pub fn chart_label(fit: &SeriesFit, benchmark_label: &str) -> String {
    format!(
        "{} fit: y={:.2}+{:.2}×{}",
        fit.label, fit.fit.intercept, fit.fit.slope, benchmark_label
    )
}

/// Scatter points and sampled fit lines for every series.
///
/// `x` is the benchmark column and `ys` holds each series' daily means, in
/// the same order as `fits`.
pub fn chart_points(
    x: &[f64],
    ys: &[Vec<f64>],
    fits: &[SeriesFit],
    samples: usize,
) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    let range = x_range(x);

    for (fit, y) in fits.iter().zip(ys) {
        points.extend(x.iter().zip(y).map(|(xi, yi)| ChartPoint {
            series: fit.label.clone(),
            kind: PointKind::Point,
            x: *xi,
            y: *yi,
        }));

        if let Some((lo, hi)) = range {
            points.extend(
                sample_line(&fit.fit, lo, hi, samples)
                    .into_iter()
                    .map(|(lx, ly)| ChartPoint {
                        series: fit.label.clone(),
                        kind: PointKind::Fit,
                        x: lx,
                        y: ly,
                    }),
            );
        }
    }

    points
}

/// Chart rows for a regression run: each series' daily means against the
/// benchmark, followed by `samples` points on its fitted line.
pub fn regression_chart(report: &PassThroughReport, samples: usize) -> Result<Vec<ChartPoint>> {
    let column = |name: &str| {
        report
            .panel
            .column(name)
            .with_context(|| format!("column {name} is not in the daily panel"))
    };

    let x = column(&report.benchmark.column)?;
    let ys = report
        .fits
        .iter()
        .map(|f| column(&f.column))
        .collect::<Result<Vec<_>>>()?;

    Ok(chart_points(&x, &ys, &report.fits, samples))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes the regression chart data to `path`, replacing any previous file.
pub fn write_chart_csv(path: &Path, points: &[ChartPoint]) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), rows = points.len(), "Writing chart data");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "Saved regression chart data");
    Ok(())
}

/// Writes the daily panel as `date,<field>...` rows.
pub fn write_daily_panel(path: &Path, panel: &DailyPanel) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(std::iter::once("date").chain(panel.fields.iter().map(String::as_str)))?;
    for row in &panel.rows {
        let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
        record.extend(row.values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), days = panel.len(), "Saved daily series");
    Ok(())
}

/// Logs a serializable report as pretty-printed JSON.
pub fn print_json(report: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
