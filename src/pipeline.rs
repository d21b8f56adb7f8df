//! Single-run orchestration: load, aggregate, fit.
//!
//! Each stage fully consumes the previous one's output. Nothing is written
//! or formatted here; the caller presents the returned values.

use crate::analyzers::aggregate::aggregate_daily;
use crate::analyzers::regression::fit_all;
use crate::analyzers::types::{AggregateStats, DailyPanel, SeriesFit};
use crate::config::{ColumnConfig, PipelineConfig, SeriesColumn};
use crate::error::Result;
use crate::loader::load_observations;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Result of a regression run: the fitted lines and the daily panel they
/// were fitted on.
#[derive(Debug, Clone, Serialize)]
pub struct PassThroughReport {
    pub benchmark: SeriesColumn,
    pub days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub cleaning: AggregateStats,
    pub fits: Vec<SeriesFit>,
    #[serde(skip)]
    pub panel: DailyPanel,
}

/// Loads the dataset and reduces it to the daily panel.
#[tracing::instrument(skip_all, fields(dataset = %config.dataset_path.display(), policy = %config.missing_policy))]
pub fn load_daily_panel(config: &PipelineConfig) -> Result<DailyPanel> {
    config.validate()?;

    let observations = load_observations(&config.dataset_path, &config.columns.required())?;
    let panel = aggregate_daily(
        &observations,
        &config.columns.date,
        &config.columns.value_fields(),
        config.missing_policy,
    )?;

    if let Some((first, last)) = panel.date_span() {
        info!(days = panel.len(), %first, %last, "Daily panel ready");
    }
    Ok(panel)
}

/// Fits every dependent series in `panel` against the benchmark.
pub fn regress_panel(panel: DailyPanel, columns: &ColumnConfig) -> Result<PassThroughReport> {
    let fits = fit_all(&panel, &columns.benchmark.column, &columns.dependent_pairs())?;
    let span = panel.date_span();

    Ok(PassThroughReport {
        benchmark: columns.benchmark.clone(),
        days: panel.len(),
        first_date: span.map(|s| s.0),
        last_date: span.map(|s| s.1),
        cleaning: panel.stats.clone(),
        fits,
        panel,
    })
}

/// Runs the long-run pass-through regression end to end.
#[tracing::instrument(skip_all)]
pub fn run_regression(config: &PipelineConfig) -> Result<PassThroughReport> {
    let panel = load_daily_panel(config)?;
    let report = regress_panel(panel, &config.columns)?;

    for fit in &report.fits {
        info!(
            series = %fit.label,
            intercept = fit.fit.intercept,
            slope = fit.fit.slope,
            observations = fit.observations,
            "Pass-through fitted"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{DailyRow, MissingPolicy};
    use crate::error::PassThroughError;
    use std::io::Write;

    #[test]
    fn test_regress_panel_builds_report() {
        let panel = DailyPanel {
            fields: vec!["diesel".into(), "e5".into(), "Brent_EUR_per_Litre".into()],
            rows: (0..5)
                .map(|i| {
                    let x = 0.5 + i as f64 * 0.05;
                    DailyRow {
                        date: NaiveDate::from_ymd_opt(2023, 1, 1 + i).unwrap(),
                        values: vec![1.0 + x, 0.8 + 1.2 * x, x],
                    }
                })
                .collect(),
            stats: AggregateStats::default(),
        };

        let report = regress_panel(panel.clone(), &ColumnConfig::default()).unwrap();

        assert_eq!(report.days, 5);
        assert_eq!(report.benchmark.label, "Brent");
        assert_eq!(report.fits.len(), 2);
        assert!((report.fits[1].fit.slope - 1.2).abs() < 1e-9);
        assert_eq!(report.first_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(report.panel, panel);
    }

    #[test]
    fn test_report_json_omits_panel() {
        let panel = DailyPanel {
            fields: vec!["diesel".into(), "e5".into(), "Brent_EUR_per_Litre".into()],
            rows: (0..3)
                .map(|i| DailyRow {
                    date: NaiveDate::from_ymd_opt(2023, 1, 1 + i).unwrap(),
                    values: vec![1.5 + i as f64 * 0.1, 1.6 + i as f64 * 0.1, 0.5 + i as f64 * 0.1],
                })
                .collect(),
            stats: AggregateStats::default(),
        };

        let report = regress_panel(panel, &ColumnConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("panel").is_none());
        assert_eq!(json["benchmark"]["label"], "Brent");
        assert_eq!(json["days"], 3);
    }

    #[test]
    fn test_run_regression_reports_missing_dataset() {
        let config = PipelineConfig {
            dataset_path: "/no/such/panel.csv".into(),
            ..Default::default()
        };

        let result = run_regression(&config);
        assert!(matches!(result, Err(PassThroughError::DatasetNotFound(_))));
    }

    #[test]
    fn test_load_daily_panel_validates_config_first() {
        let mut config = PipelineConfig::default();
        config.columns.dependents.clear();

        let result = load_daily_panel(&config);
        assert!(matches!(result, Err(PassThroughError::Config(_))));
    }

    #[test]
    fn test_run_regression_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "date,station,diesel,e5,Brent_EUR_per_Litre").unwrap();
        writeln!(file, "2023-01-01,a,1.50,1.60,0.50").unwrap();
        writeln!(file, "2023-01-01,b,1.52,1.62,0.50").unwrap();
        writeln!(file, "2023-01-02,a,1.61,1.71,0.60").unwrap();
        writeln!(file, "2023-01-03,a,1.71,,0.70").unwrap();
        writeln!(file, "2023-01-03,b,1.71,1.81,0.70").unwrap();

        let config = PipelineConfig {
            dataset_path: file.path().to_path_buf(),
            missing_policy: MissingPolicy::DropIncomplete,
            ..Default::default()
        };

        let report = run_regression(&config).unwrap();

        assert_eq!(report.days, 3);
        assert_eq!(report.cleaning.incomplete, 1);
        assert!((report.fits[0].fit.slope - 1.0).abs() < 1e-9);
        assert!((report.fits[0].fit.intercept - 1.01).abs() < 1e-9);
    }
}
