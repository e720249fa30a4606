//! Local regression (LOESS) smoother.
//!
//! This is the plain unweighted variant: an ordinary least-squares line over
//! each clamped window, evaluated at the window's center point. No tricube
//! kernel is applied; whether the upstream omission of kernel weighting was
//! intentional is an open product question, so the behavior is preserved
//! exactly rather than upgraded.

use crate::domain::{CurvePoint, Observation};

/// Guard for a zero-variance (all x identical) window.
const VARIANCE_TOL: f64 = 1e-12;

/// Smooth `data` with an unweighted local linear regression.
///
/// `span` is the fraction of the dataset included in each local window:
/// `floor(n * span / 2)` points on each side of the center, clamped to the
/// data bounds. Windows with fewer than two points, and windows whose x
/// values are all identical, pass the raw value through.
pub fn loess(data: &[Observation], span: f64) -> Vec<CurvePoint> {
    let n = data.len();
    let half_span = (n as f64 * span / 2.0).floor() as usize;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(half_span);
        let hi = (i + half_span).min(n - 1);
        let window = &data[lo..=hi];
        out.push(CurvePoint {
            x: data[i].x,
            y: local_line_value(window, data[i].x, data[i].y),
        });
    }
    out
}

/// Least-squares line over `window`, evaluated at `x`; `raw_y` when the
/// window is too small or degenerate.
fn local_line_value(window: &[Observation], x: f64, raw_y: f64) -> f64 {
    if window.len() < 2 {
        return raw_y;
    }

    let n = window.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for o in window {
        sum_x += o.x;
        sum_y += o.y;
    }
    let x_mean = sum_x / n;
    let y_mean = sum_y / n;

    // Centered accumulation keeps the slope denominator well conditioned.
    let mut variance = 0.0;
    let mut covariance = 0.0;
    for o in window {
        let dx = o.x - x_mean;
        variance += dx * dx;
        covariance += dx * (o.y - y_mean);
    }

    if !(variance.is_finite() && covariance.is_finite()) || variance <= VARIANCE_TOL {
        return raw_y;
    }

    let slope = covariance / variance;
    let intercept = y_mean - slope * x_mean;
    intercept + slope * x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[(f64, f64)]) -> Vec<Observation> {
        values.iter().map(|&(x, y)| Observation::new(x, y)).collect()
    }

    #[test]
    fn tiny_datasets_pass_through() {
        for data in [
            series(&[]),
            series(&[(3.0, 7.0)]),
            series(&[(0.0, 1.0), (1.0, 2.0)]),
        ] {
            for &span in &[0.1, 0.5, 1.0] {
                let smoothed = loess(&data, span);
                assert_eq!(smoothed.len(), data.len());
                for (o, p) in data.iter().zip(&smoothed) {
                    assert_eq!(p.x, o.x);
                    assert_eq!(p.y, o.y);
                }
            }
        }
    }

    #[test]
    fn linear_data_is_reproduced() {
        let data: Vec<Observation> =
            (0..20).map(|i| Observation::new(i as f64, 3.0 + 2.0 * i as f64)).collect();
        let smoothed = loess(&data, 0.5);
        for (o, p) in data.iter().zip(&smoothed) {
            assert!((p.y - o.y).abs() < 1e-9, "x = {}: {} vs {}", o.x, p.y, o.y);
        }
    }

    #[test]
    fn identical_x_window_falls_back_to_raw() {
        // All x equal: the slope denominator is exactly zero.
        let data = series(&[(5.0, 1.0), (5.0, 2.0), (5.0, 3.0), (5.0, 4.0)]);
        let smoothed = loess(&data, 1.0);
        for (o, p) in data.iter().zip(&smoothed) {
            assert_eq!(p.y, o.y);
        }
    }

    #[test]
    fn smoothing_reduces_noise_on_a_bump() {
        // A noisy ramp: the smoothed center values should sit between the
        // noisy extremes rather than track them.
        let data = series(&[
            (0.0, 0.0),
            (1.0, 2.0),
            (2.0, 0.5),
            (3.0, 2.5),
            (4.0, 1.0),
            (5.0, 3.0),
            (6.0, 1.5),
            (7.0, 3.5),
        ]);
        let smoothed = loess(&data, 0.8);
        let raw_jump = (data[2].y - data[1].y).abs();
        let smooth_jump = (smoothed[2].y - smoothed[1].y).abs();
        assert!(smooth_jump < raw_jump);
    }
}
