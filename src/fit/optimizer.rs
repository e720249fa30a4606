//! Derivative-free parameter calibration.
//!
//! Coordinate descent with adaptive per-coordinate step sizes:
//!
//! - three outer passes; step sizes are re-derived from the current values at
//!   the start of each pass and shrink geometrically across passes
//! - up to 50 inner iterations per pass, probing `+step` / `-step` for every
//!   tunable coordinate while holding the others at the current best
//! - a failed probe decays that coordinate's own step slowly (factor 0.98)
//!   instead of halving it, which avoids premature convergence
//! - a full sweep with no improvement ends the pass early
//!
//! Why coordinate descent? The model functions are not guaranteed to be
//! differentiation-friendly here, and the parameters have heterogeneous
//! natural scales. The search is deterministic given identical inputs (no
//! randomness) and never fails: non-finite candidate errors simply count as
//! non-improvements.

use crate::domain::{CalibrationOutcome, DoubleLogisticParams, Observation, ParamLocks, ParametricParams};
use crate::models::predict;

/// Outer passes over the full coordinate set.
const PASSES: i32 = 3;
/// Inner iteration cap per pass.
const MAX_ITERATIONS: usize = 50;
/// Geometric step shrink across passes.
const PASS_SHRINK: f64 = 1.5;
/// Per-coordinate step decay on a failed probe.
const STEP_DECAY: f64 = 0.98;
/// Gap inserted when an inverted season must be repaired.
const REPAIR_GAP: f64 = 20.0;

/// Mean squared error of `eval(x, coords)` against the observations.
///
/// Empty data scores 0 (nothing to disagree with).
pub fn mean_squared_error<F>(data: &[Observation], coords: &[f64], eval: &F) -> f64
where
    F: Fn(f64, &[f64]) -> f64,
{
    if data.is_empty() {
        return 0.0;
    }
    let mut sse = 0.0;
    for o in data {
        let r = o.y - eval(o.x, coords);
        sse += r * r;
    }
    sse / data.len() as f64
}

/// Minimize the mean squared error of `eval` over the unlocked coordinates.
///
/// Locked coordinates are never probed or written. Returns the input
/// coordinates unchanged when the data is empty or every coordinate is
/// locked. The returned coordinates never score worse than the input.
///
/// # Panics
/// Panics if `locked.len() != initial.len()`.
pub fn minimize<F>(data: &[Observation], initial: &[f64], locked: &[bool], eval: F) -> Vec<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    assert_eq!(
        locked.len(),
        initial.len(),
        "lock mask must match coordinate count"
    );

    let tunable: Vec<usize> = (0..initial.len()).filter(|&i| !locked[i]).collect();
    let mut best = initial.to_vec();
    if data.is_empty() || tunable.is_empty() {
        return best;
    }

    let mut best_mse = mean_squared_error(data, &best, &eval);
    for pass in 0..PASSES {
        let shrink = PASS_SHRINK.powi(pass);
        let mut steps: Vec<f64> = tunable
            .iter()
            .map(|&i| (best[i].abs() * 0.1).max(0.01) / shrink)
            .collect();

        for _ in 0..MAX_ITERATIONS {
            let mut improved = false;
            for (slot, &i) in tunable.iter().enumerate() {
                let step = steps[slot];
                let current = best[i];

                best[i] = current + step;
                let up = mean_squared_error(data, &best, &eval);
                best[i] = current - step;
                let down = mean_squared_error(data, &best, &eval);

                // Keep the better improving direction; restore and decay the
                // step otherwise.
                let up_improves = up < best_mse;
                let down_improves = down < best_mse;
                if up_improves && (!down_improves || up <= down) {
                    best[i] = current + step;
                    best_mse = up;
                    improved = true;
                } else if down_improves {
                    best_mse = down;
                    improved = true;
                } else {
                    best[i] = current;
                    steps[slot] *= STEP_DECAY;
                }
            }
            if !improved {
                break;
            }
        }
    }
    best
}

/// Calibrate a parametric model against the observations.
///
/// Flattens the parameters to coordinates, runs [`minimize`], and for the
/// double logistic family repairs an inverted season (`start >= end`)
/// afterwards: `end = start + 20` when `start` lies past the dataset's x
/// midpoint, otherwise the two are swapped. The repair is skipped when either
/// boundary is locked, so locked parameters are returned bit-for-bit.
///
/// Expects `data` in the same (normalized) axis units as the location
/// parameters; [`orchestrator::calibrate_model`](crate::fit::calibrate_model)
/// handles the axis conversion.
pub fn calibrate(
    data: &[Observation],
    initial: &ParametricParams,
    locks: &ParamLocks,
) -> CalibrationOutcome {
    let coords = initial.coords();
    let mut notes = Vec::new();

    let mask = locks.mask();
    let locked = if mask.len() == coords.len() {
        mask
    } else {
        notes.push("Lock set does not match the model family; ignoring locks.".to_string());
        vec![false; coords.len()]
    };

    let family = *initial;
    let eval = move |x: f64, c: &[f64]| predict(&family.with_coords(c), x);
    let optimized = minimize(data, &coords, &locked, &eval);
    let mut params = initial.with_coords(&optimized);

    if let ParametricParams::DoubleLogistic(p) = &mut params {
        let (start_locked, end_locked) = match locks {
            ParamLocks::DoubleLogistic(l) => (l.start, l.end),
            _ => (false, false),
        };
        if p.start >= p.end {
            if start_locked || end_locked {
                notes.push(
                    "Season boundaries are inverted but locked; skipping repair.".to_string(),
                );
            } else if let Some(mid) = x_midpoint(data) {
                repair_season_bounds(p, mid);
                notes.push(format!(
                    "Repaired inverted season boundaries: start = {:.3}, end = {:.3}.",
                    p.start, p.end
                ));
            }
        }
    }

    let mse = mean_squared_error(data, &params.coords(), &eval);
    CalibrationOutcome { params, mse, notes }
}

/// Midpoint of the observed x range.
fn x_midpoint(data: &[Observation]) -> Option<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for o in data {
        min = min.min(o.x);
        max = max.max(o.x);
    }
    (min <= max).then_some((min + max) / 2.0)
}

/// Make `start < end` hold again after optimization.
///
/// An inverted season would make SOS/EOS derivation meaningless, so it is
/// repaired deterministically rather than reported as an error.
fn repair_season_bounds(p: &mut DoubleLogisticParams, mid_x: f64) {
    if p.start > mid_x {
        p.end = p.start + REPAIR_GAP;
    } else {
        std::mem::swap(&mut p.start, &mut p.end);
    }
}
