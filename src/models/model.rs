//! Model evaluation for the double and single logistic families.
//!
//! The fitter relies on two primitive operations:
//! - evaluate a family at a given `x` (for residuals/curves)
//! - evaluate from a raw coordinate vector (for the optimizer)
//!
//! Both are pure and deterministic: no side effects, no allocation beyond the
//! return value.

use crate::domain::{DoubleLogisticParams, ParametricParams, SingleLogisticParams};
use crate::math::sigmoid;

/// Evaluate the double logistic curve at `x`.
pub fn double_logistic(x: f64, p: &DoubleLogisticParams) -> f64 {
    let rise = sigmoid(p.growth_rate * (x - p.start));
    let fall = sigmoid(p.senescence_rate * (x - p.end));
    p.baseline + p.amplitude * rise * (1.0 - fall)
}

/// Evaluate the single logistic curve at `x`.
pub fn single_logistic(x: f64, p: &SingleLogisticParams) -> f64 {
    p.max_value / (1.0 + (-p.steepness * (x - p.midpoint)).exp())
}

/// Evaluate whichever parametric family `params` selects.
pub fn predict(params: &ParametricParams, x: f64) -> f64 {
    match params {
        ParametricParams::DoubleLogistic(p) => double_logistic(x, p),
        ParametricParams::SingleLogistic(p) => single_logistic(x, p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season() -> DoubleLogisticParams {
        DoubleLogisticParams {
            baseline: 0.1,
            amplitude: 0.6,
            start: 50.0,
            end: 150.0,
            growth_rate: 0.2,
            senescence_rate: 0.2,
        }
    }

    #[test]
    fn double_logistic_approaches_baseline_outside_the_season() {
        let p = season();
        assert!((double_logistic(-1e4, &p) - p.baseline).abs() < 1e-9);
        assert!((double_logistic(1e4, &p) - p.baseline).abs() < 1e-9);
    }

    #[test]
    fn double_logistic_plateau_reaches_baseline_plus_amplitude() {
        let p = season();
        // Mid-season, far from both inflections relative to the rates.
        let mid = double_logistic(100.0, &p);
        assert!((mid - (p.baseline + p.amplitude)).abs() < 1e-3, "mid = {mid}");
    }

    #[test]
    fn single_logistic_is_half_max_at_midpoint() {
        let p = SingleLogisticParams {
            max_value: 0.8,
            steepness: 0.3,
            midpoint: 42.0,
        };
        assert!((single_logistic(42.0, &p) - 0.4).abs() < 1e-12);
        assert!((single_logistic(1e4, &p) - 0.8).abs() < 1e-9);
        assert!(single_logistic(-1e4, &p).abs() < 1e-9);
    }

    #[test]
    fn predict_dispatches_per_family() {
        let p = season();
        let params = ParametricParams::DoubleLogistic(p);
        assert_eq!(predict(&params, 100.0), double_logistic(100.0, &p));
    }
}
