use crate::analyzers::types::{AggregateStats, DailyPanel, DailyRow, MissingPolicy, RawObservation};
use crate::analyzers::utility::{MeanAccumulator, parse_date};
use crate::error::{PassThroughError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Collapses station-level observations into one row per calendar date.
///
/// Each row holds the mean of every field in `value_fields`, in that order.
/// Observations with an unparseable date are skipped. Missing values are
/// handled according to `policy`, and any date left with a null mean is
/// dropped. Rows come back sorted by date.
///
/// # Errors
///
/// [`PassThroughError::Config`] if `value_fields` is empty, and
/// [`PassThroughError::EmptyResult`] if no date survives cleaning.
pub fn aggregate_daily(
    observations: &[RawObservation],
    date_field: &str,
    value_fields: &[String],
    policy: MissingPolicy,
) -> Result<DailyPanel> {
    if value_fields.is_empty() {
        return Err(PassThroughError::Config(
            "at least one value field is required for aggregation".into(),
        ));
    }

    let mut stats = AggregateStats {
        rows_read: observations.len(),
        ..Default::default()
    };

    // BTreeMap keeps dates ordered, so no sort is needed afterwards.
    let mut groups: BTreeMap<NaiveDate, Vec<MeanAccumulator>> = BTreeMap::new();

    for obs in observations {
        let Some(date) = obs.text(date_field).and_then(parse_date) else {
            stats.invalid_date += 1;
            continue;
        };

        let values: Vec<Option<f64>> = value_fields.iter().map(|f| obs.number(f)).collect();

        if policy == MissingPolicy::DropIncomplete && values.iter().any(Option::is_none) {
            stats.incomplete += 1;
            continue;
        }

        let accs = groups
            .entry(date)
            .or_insert_with(|| vec![MeanAccumulator::default(); value_fields.len()]);

        for (acc, value) in accs.iter_mut().zip(values) {
            if let Some(v) = value {
                acc.push(v);
            }
        }
    }

    stats.groups = groups.len();

    let mut rows = Vec::with_capacity(groups.len());
    for (date, accs) in groups {
        let means: Option<Vec<f64>> = accs.iter().map(MeanAccumulator::mean).collect();
        match means {
            Some(values) => rows.push(DailyRow { date, values }),
            None => {
                debug!(%date, "Dropping date with a null daily mean");
                stats.null_mean_groups += 1;
            }
        }
    }

    info!(
        rows_read = stats.rows_read,
        invalid_date = stats.invalid_date,
        incomplete = stats.incomplete,
        groups = stats.groups,
        null_mean_groups = stats.null_mean_groups,
        days = rows.len(),
        %policy,
        "Daily aggregation complete"
    );

    if rows.is_empty() {
        return Err(PassThroughError::EmptyResult {
            rows_read: stats.rows_read,
        });
    }

    Ok(DailyPanel {
        fields: value_fields.to_vec(),
        rows,
        stats,
    })
}
