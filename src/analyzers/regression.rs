//! Ordinary least squares for the levels pass-through model.

use crate::analyzers::types::{DailyPanel, LinearFit, SeriesFit};
use crate::error::{PassThroughError, Result};
use tracing::debug;

/// Fits `y = intercept + slope * x` by ordinary least squares.
///
/// Data are centred on their means before the cross products are formed.
///
/// # Errors
///
/// [`PassThroughError::DegenerateInput`] when the series lengths differ, there
/// are fewer than two points, a value is not finite, every `x` is equal, or
/// the centred sums overflow.
pub fn fit(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    fit_series("y", x, y)
}

/// [`fit`] with `series` named in any error.
pub fn fit_series(series: &str, x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(PassThroughError::degenerate(
            series,
            format!("x has {} points but y has {}", x.len(), y.len()),
        ));
    }
    if x.len() < 2 {
        return Err(PassThroughError::degenerate(
            series,
            format!("need at least 2 points, got {}", x.len()),
        ));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(PassThroughError::degenerate(series, "non-finite value in input"));
    }
    if x.iter().all(|v| *v == x[0]) {
        return Err(PassThroughError::degenerate(series, "zero variance in x"));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        sxy += dx * (yi - y_mean);
        sxx += dx * dx;
    }

    if !(x_mean.is_finite() && y_mean.is_finite() && sxx.is_finite() && sxy.is_finite()) {
        return Err(PassThroughError::degenerate(
            series,
            "sums overflow double precision",
        ));
    }
    if sxx <= 0.0 {
        return Err(PassThroughError::degenerate(series, "zero variance in x"));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    debug!(series, points = x.len(), intercept, slope, "OLS fit");

    Ok(LinearFit { intercept, slope })
}

/// Fits every dependent column against the same independent column.
///
/// `dependents` pairs a panel column with its display label.
pub fn fit_all(
    panel: &DailyPanel,
    independent: &str,
    dependents: &[(String, String)],
) -> Result<Vec<SeriesFit>> {
    let x = panel
        .column(independent)
        .ok_or_else(|| PassThroughError::MissingColumn(independent.to_string()))?;

    dependents
        .iter()
        .map(|(column, label)| {
            let y = panel
                .column(column)
                .ok_or_else(|| PassThroughError::MissingColumn(column.clone()))?;
            let fit = fit_series(column, &x, &y)?;
            Ok(SeriesFit {
                column: column.clone(),
                label: label.clone(),
                observations: x.len(),
                fit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{AggregateStats, DailyRow};
    use chrono::NaiveDate;

    #[test]
    fn test_exact_line_is_recovered() {
        let x: Vec<f64> = (0..50).map(|i| 0.4 + i as f64 * 0.01).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.5 + 1.5 * v).collect();

        let line = fit(&x, &y).unwrap();

        assert!((line.intercept - 2.5).abs() < 1e-9);
        assert!((line.slope - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_large_magnitude_inputs() {
        let x: Vec<f64> = (0..20).map(|i| 1.0e8 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 - 0.5 * v).collect();

        let line = fit(&x, &y).unwrap();

        assert!((line.slope + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_fit_minimises_residuals() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 2.0, 4.0];

        let line = fit(&x, &y).unwrap();

        // x̄ = 2.5, ȳ = 2.5, sxy = 2.0, sxx = 5.0
        assert!((line.slope - 0.8).abs() < 1e-12);
        assert!((line.intercept - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_degenerate() {
        let result = fit(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(PassThroughError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let result = fit(&[0.6], &[1.81]);
        assert!(matches!(
            result,
            Err(PassThroughError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_length_mismatch_is_degenerate() {
        let result = fit_series("e5", &[1.0, 2.0, 3.0], &[1.0, 2.0]);
        match result {
            Err(PassThroughError::DegenerateInput { series, reason }) => {
                assert_eq!(series, "e5");
                assert!(reason.contains("3 points"));
            }
            other => panic!("expected degenerate input, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_is_degenerate() {
        let result = fit(&[1.0, f64::NAN], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(PassThroughError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_overflowing_sums_are_degenerate() {
        let result = fit(&[1e200, 2e200, 3e200], &[1.0, 2.0, 3.0]);
        match result {
            Err(PassThroughError::DegenerateInput { reason, .. }) => {
                assert!(reason.contains("overflow"));
            }
            other => panic!("expected degenerate input, got {other:?}"),
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x: Vec<f64> = (0..100).map(|i| (i as f64).sin() + 2.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.9 + 1.1 * v + (v * 7.0).cos() * 0.01).collect();

        let a = fit(&x, &y).unwrap();
        let b = fit(&x, &y).unwrap();

        assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
        assert_eq!(a.slope.to_bits(), b.slope.to_bits());
    }

    #[test]
    fn test_fit_all_shares_independent_series() {
        let panel = panel(&[(0.5, 1.5, 1.6), (0.6, 1.6, 1.8), (0.7, 1.7, 2.0)]);
        let dependents = vec![
            ("diesel".to_string(), "Diesel".to_string()),
            ("e5".to_string(), "E5".to_string()),
        ];

        let fits = fit_all(&panel, "brent", &dependents).unwrap();

        assert_eq!(fits.len(), 2);
        assert_eq!(fits[0].label, "Diesel");
        assert_eq!(fits[0].observations, 3);
        assert!((fits[0].fit.slope - 1.0).abs() < 1e-9);
        assert!((fits[0].fit.intercept - 1.0).abs() < 1e-9);
        assert!((fits[1].fit.slope - 2.0).abs() < 1e-9);
        assert!((fits[1].fit.intercept - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_fit_all_unknown_column() {
        let panel = panel(&[(0.5, 1.5, 1.6), (0.6, 1.6, 1.8)]);
        let dependents = vec![("lpg".to_string(), "LPG".to_string())];

        let result = fit_all(&panel, "brent", &dependents);
        assert!(matches!(result, Err(PassThroughError::MissingColumn(c)) if c == "lpg"));
    }

    // Helper functions for tests
    fn panel(rows: &[(f64, f64, f64)]) -> DailyPanel {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        DailyPanel {
            fields: vec!["brent".into(), "diesel".into(), "e5".into()],
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (b, d, e))| DailyRow {
                    date: start + chrono::Days::new(i as u64),
                    values: vec![*b, *d, *e],
                })
                .collect(),
            stats: AggregateStats::default(),
        }
    }
}
