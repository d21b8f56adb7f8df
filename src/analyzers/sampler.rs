use crate::analyzers::types::LinearFit;

/// Number of points used to draw a fitted line.
pub const DEFAULT_LINE_SAMPLES: usize = 200;

/// Returns `(min, max)` of `values`, or `None` when empty.
pub fn x_range(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}

/// Evenly spaced points along `fit` from `x_min` to `x_max` inclusive.
///
/// The first point is exactly `x_min` and the last exactly `x_max`. A single
/// sample sits at `x_min`.
pub fn sample_line(fit: &LinearFit, x_min: f64, x_max: f64, samples: usize) -> Vec<(f64, f64)> {
    match samples {
        0 => Vec::new(),
        1 => vec![(x_min, fit.predict(x_min))],
        n => {
            let step = (x_max - x_min) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let x = if i == n - 1 {
                        x_max
                    } else {
                        x_min + step * i as f64
                    };
                    (x, fit.predict(x))
                })
                .collect()
        }
    }
}
