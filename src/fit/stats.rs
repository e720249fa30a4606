//! Goodness-of-fit statistics.

use crate::domain::FitStatistics;

/// R-squared and RMSE of predictions aligned 1:1 with observations.
///
/// Conventions:
/// - constant observed data (`SS_tot == 0`) reports `r2 = 1` regardless of
///   the predictions
/// - any NaN (zero-length data, pathological inputs) collapses to 0 rather
///   than propagating
/// - misaligned lengths report zeros; callers are expected to pass aligned
///   slices
pub fn fit_statistics(observed: &[f64], predicted: &[f64]) -> FitStatistics {
    if observed.is_empty() || observed.len() != predicted.len() {
        return FitStatistics::default();
    }

    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p) * (y - p))
        .sum();

    let r2 = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };
    let rmse = (ss_res / n).sqrt();

    FitStatistics {
        r2: if r2.is_nan() { 0.0 } else { r2 },
        rmse: if rmse.is_nan() { 0.0 } else { rmse },
    }
}
