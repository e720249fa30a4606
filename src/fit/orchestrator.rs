//! Fit orchestration.
//!
//! Responsibilities, per fit request:
//!
//! - normalize the x axis (date-millisecond inputs become day offsets, with
//!   location parameters converted in lockstep)
//! - dispatch to the parametric models or the smoothers
//! - derive key points and goodness-of-fit statistics
//! - denormalize every output back to caller units
//!
//! The orchestrator never mutates caller-owned structures and never fails:
//! an empty observation sequence short-circuits to the "no fit" output
//! without touching any model code.

use crate::domain::{
    AxisKind, CalibrationOutcome, CurvePoint, DoubleLogisticParams, FitOutput, KeyPoints, Model,
    MS_PER_DAY, Observation, ParamLocks, ParametricParams, SingleLogisticParams,
};
use crate::fit::keypoints::{peak_point, single_logistic_key_points, smoothed_key_points};
use crate::fit::optimizer;
use crate::fit::stats::fit_statistics;
use crate::models::predict;
use crate::smooth::{loess, moving_average, savgol_config_is_valid, savitzky_golay};

/// Grid samples for parametric curves.
const GRID_POINTS: usize = 200;

/// Affine x-axis transform between caller units and model units.
#[derive(Debug, Clone, Copy)]
struct AxisTransform {
    offset: f64,
    scale: f64,
}

impl AxisTransform {
    fn for_axis(axis: AxisKind, min_x: f64) -> Self {
        match axis {
            // Non-date axes pass through unchanged.
            AxisKind::Numeric => Self {
                offset: 0.0,
                scale: 1.0,
            },
            // Date axes become days since the dataset minimum.
            AxisKind::DateMillis => Self {
                offset: min_x,
                scale: MS_PER_DAY,
            },
        }
    }

    fn normalize(&self, x: f64) -> f64 {
        (x - self.offset) / self.scale
    }

    fn denormalize(&self, x: f64) -> f64 {
        x * self.scale + self.offset
    }
}

/// Location parameters (`start`, `end`, `midpoint`) follow the axis transform;
/// rate and value parameters do not.
fn normalize_parametric(params: &ParametricParams, t: &AxisTransform) -> ParametricParams {
    match params {
        ParametricParams::DoubleLogistic(p) => {
            ParametricParams::DoubleLogistic(DoubleLogisticParams {
                start: t.normalize(p.start),
                end: t.normalize(p.end),
                ..*p
            })
        }
        ParametricParams::SingleLogistic(p) => {
            ParametricParams::SingleLogistic(SingleLogisticParams {
                midpoint: t.normalize(p.midpoint),
                ..*p
            })
        }
    }
}

fn denormalize_parametric(params: &ParametricParams, t: &AxisTransform) -> ParametricParams {
    match params {
        ParametricParams::DoubleLogistic(p) => {
            ParametricParams::DoubleLogistic(DoubleLogisticParams {
                start: t.denormalize(p.start),
                end: t.denormalize(p.end),
                ..*p
            })
        }
        ParametricParams::SingleLogistic(p) => {
            ParametricParams::SingleLogistic(SingleLogisticParams {
                midpoint: t.denormalize(p.midpoint),
                ..*p
            })
        }
    }
}

/// Fit `model` to `data` and derive key points and statistics.
///
/// Parametric models are sampled on a 200-point even grid over the observed
/// x range; smoothers return one fitted point per observation at the original
/// x positions. All outputs are in caller axis units.
pub fn fit(data: &[Observation], model: &Model, axis: AxisKind) -> FitOutput {
    if data.is_empty() {
        return FitOutput::empty();
    }

    // Sort once: the smoothers rely on ascending x and the parametric grid
    // needs the observed range.
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let transform = AxisTransform::for_axis(axis, sorted[0].x);
    let normalized: Vec<Observation> = sorted
        .iter()
        .map(|o| Observation {
            x: transform.normalize(o.x),
            ..o.clone()
        })
        .collect();

    match model {
        Model::DoubleLogistic(p) => {
            let params = normalize_parametric(&ParametricParams::DoubleLogistic(*p), &transform);
            fit_parametric(&normalized, &params, &transform)
        }
        Model::SingleLogistic(p) => {
            let params = normalize_parametric(&ParametricParams::SingleLogistic(*p), &transform);
            fit_parametric(&normalized, &params, &transform)
        }
        Model::Loess(p) => {
            let fitted = loess(&normalized, p.span);
            fit_smoothed(&normalized, fitted, &transform, Vec::new())
        }
        Model::MovingAverage(p) => {
            let fitted = moving_average(&normalized, p.window_size);
            fit_smoothed(&normalized, fitted, &transform, Vec::new())
        }
        Model::SavitzkyGolay(p) => {
            let mut notes = Vec::new();
            if !savgol_config_is_valid(normalized.len(), p.window_size, p.poly_order) {
                notes.push(format!(
                    "Savitzky-Golay window {} / order {} is unsupported for {} points; \
                     falling back to a moving average.",
                    p.window_size,
                    p.poly_order,
                    normalized.len()
                ));
            }
            let fitted = savitzky_golay(&normalized, p.window_size, p.poly_order);
            fit_smoothed(&normalized, fitted, &transform, notes)
        }
    }
}

/// Calibrate a parametric model, handling the axis conversion around the
/// optimizer.
///
/// The returned parameters are in caller axis units, ready to be passed back
/// into [`fit`]. Empty data returns the initial parameters unchanged.
pub fn calibrate_model(
    data: &[Observation],
    initial: &ParametricParams,
    locks: &ParamLocks,
    axis: AxisKind,
) -> CalibrationOutcome {
    if data.is_empty() {
        return CalibrationOutcome {
            params: *initial,
            mse: 0.0,
            notes: Vec::new(),
        };
    }

    let min_x = data.iter().map(|o| o.x).fold(f64::INFINITY, f64::min);
    let transform = AxisTransform::for_axis(axis, min_x);
    let normalized: Vec<Observation> = data
        .iter()
        .map(|o| Observation {
            x: transform.normalize(o.x),
            ..o.clone()
        })
        .collect();

    let initial_normalized = normalize_parametric(initial, &transform);
    let outcome = optimizer::calibrate(&normalized, &initial_normalized, locks);

    CalibrationOutcome {
        params: denormalize_parametric(&outcome.params, &transform),
        mse: outcome.mse,
        notes: outcome.notes,
    }
}

/// Sample a parametric model on the grid and derive its key points and
/// statistics. `data` and `params` are already in normalized units.
fn fit_parametric(
    data: &[Observation],
    params: &ParametricParams,
    transform: &AxisTransform,
) -> FitOutput {
    let lo = data[0].x;
    let hi = data[data.len() - 1].x;

    let mut curve = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_POINTS {
        let u = i as f64 / (GRID_POINTS as f64 - 1.0);
        let x = lo + u * (hi - lo);
        curve.push(CurvePoint {
            x: transform.denormalize(x),
            y: predict(params, x),
        });
    }

    let key_points = match params {
        ParametricParams::DoubleLogistic(p) => KeyPoints {
            // SOS/EOS anchor to the season-boundary parameters themselves.
            sos: Some(CurvePoint {
                x: transform.denormalize(p.start),
                y: predict(params, p.start),
            }),
            eos: Some(CurvePoint {
                x: transform.denormalize(p.end),
                y: predict(params, p.end),
            }),
            peak: peak_point(&curve),
        },
        ParametricParams::SingleLogistic(p) => single_logistic_key_points(&curve, p.max_value),
    };

    let observed: Vec<f64> = data.iter().map(|o| o.y).collect();
    let predicted: Vec<f64> = data.iter().map(|o| predict(params, o.x)).collect();

    FitOutput {
        curve,
        key_points,
        statistics: fit_statistics(&observed, &predicted),
        notes: Vec::new(),
    }
}

/// Wrap a smoother's output: denormalize, derive key points, score the fit.
fn fit_smoothed(
    data: &[Observation],
    fitted: Vec<CurvePoint>,
    transform: &AxisTransform,
    notes: Vec<String>,
) -> FitOutput {
    let curve: Vec<CurvePoint> = fitted
        .iter()
        .map(|p| CurvePoint {
            x: transform.denormalize(p.x),
            y: p.y,
        })
        .collect();

    let key_points = smoothed_key_points(&curve);

    let observed: Vec<f64> = data.iter().map(|o| o.y).collect();
    let predicted: Vec<f64> = fitted.iter().map(|p| p.y).collect();

    FitOutput {
        curve,
        key_points,
        statistics: fit_statistics(&observed, &predicted),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoessParams, MovingAverageParams, SavitzkyGolayParams};
    use chrono::NaiveDate;

    fn scenario_a_data() -> Vec<Observation> {
        [
            (0.0, 0.1),
            (50.0, 0.2),
            (100.0, 0.7),
            (150.0, 0.65),
            (200.0, 0.15),
        ]
        .iter()
        .map(|&(x, y)| Observation::new(x, y))
        .collect()
    }

    fn scenario_a_params() -> DoubleLogisticParams {
        DoubleLogisticParams {
            baseline: 0.1,
            amplitude: 0.6,
            start: 50.0,
            end: 150.0,
            growth_rate: 0.1,
            senescence_rate: 0.1,
        }
    }

    #[test]
    fn double_logistic_scenario_fits_season_landmarks() {
        let data = scenario_a_data();
        let output = fit(
            &data,
            &Model::DoubleLogistic(scenario_a_params()),
            AxisKind::Numeric,
        );

        assert_eq!(output.curve.len(), 200);
        assert_eq!(output.curve[0].x, 0.0);
        assert_eq!(output.curve[199].x, 200.0);

        let peak = output.key_points.peak.unwrap();
        assert!((peak.y - 0.7).abs() < 0.05, "peak y = {}", peak.y);

        let sos = output.key_points.sos.unwrap();
        let eos = output.key_points.eos.unwrap();
        assert!((sos.x - 50.0).abs() <= 10.0, "sos x = {}", sos.x);
        assert!((eos.x - 150.0).abs() <= 10.0, "eos x = {}", eos.x);
    }

    #[test]
    fn moving_average_scenario_shrinks_boundary_windows() {
        let data: Vec<Observation> = (0..5)
            .map(|i| Observation::new(i as f64, (i + 1) as f64))
            .collect();
        let output = fit(
            &data,
            &Model::MovingAverage(MovingAverageParams { window_size: 3 }),
            AxisKind::Numeric,
        );
        let expected = [1.5, 2.0, 3.0, 4.0, 4.5];
        assert_eq!(output.curve.len(), 5);
        for (p, &e) in output.curve.iter().zip(&expected) {
            assert_eq!(p.y, e);
        }
    }

    #[test]
    fn empty_dataset_short_circuits_for_every_model() {
        let models = [
            Model::DoubleLogistic(scenario_a_params()),
            Model::SingleLogistic(SingleLogisticParams {
                max_value: 1.0,
                steepness: 0.1,
                midpoint: 50.0,
            }),
            Model::Loess(LoessParams { span: 0.5 }),
            Model::MovingAverage(MovingAverageParams { window_size: 3 }),
            Model::SavitzkyGolay(SavitzkyGolayParams::with_window(5)),
        ];
        for model in &models {
            let output = fit(&[], model, AxisKind::Numeric);
            assert!(output.curve.is_empty());
            assert_eq!(output.key_points, KeyPoints::default());
            assert_eq!(output.statistics.r2, 0.0);
            assert_eq!(output.statistics.rmse, 0.0);
        }
    }

    #[test]
    fn even_savgol_window_matches_moving_average_bit_for_bit() {
        let data: Vec<Observation> = (0..8)
            .map(|i| Observation::new(i as f64, (i as f64 * 0.7).sin()))
            .collect();
        let savgol = fit(
            &data,
            &Model::SavitzkyGolay(SavitzkyGolayParams {
                window_size: 4,
                poly_order: 2,
            }),
            AxisKind::Numeric,
        );
        let ma = fit(
            &data,
            &Model::MovingAverage(MovingAverageParams { window_size: 4 }),
            AxisKind::Numeric,
        );
        assert_eq!(savgol.curve, ma.curve);
        assert!(!savgol.notes.is_empty());
        assert!(ma.notes.is_empty());
    }

    #[test]
    fn single_logistic_thresholds_derive_sos_and_eos() {
        let params = SingleLogisticParams {
            max_value: 1.0,
            steepness: 0.2,
            midpoint: 50.0,
        };
        let data: Vec<Observation> = (0..=10)
            .map(|i| Observation::new(i as f64 * 10.0, 0.0))
            .collect();
        let output = fit(&data, &Model::SingleLogistic(params), AxisKind::Numeric);

        let sos = output.key_points.sos.unwrap();
        let eos = output.key_points.eos.unwrap();
        // 10% of max at x0 - ln(9)/k ~ 39.0; 90% at x0 + ln(9)/k ~ 61.0.
        assert!((sos.x - 39.0).abs() < 2.0, "sos x = {}", sos.x);
        assert!((eos.x - 61.0).abs() < 2.0, "eos x = {}", eos.x);
        assert!(sos.y >= 0.1 && eos.y >= 0.9);
    }

    #[test]
    fn smoother_statistics_align_one_to_one() {
        // Window 1 is the identity, so the "fit" is perfect by construction.
        let data: Vec<Observation> = (0..6)
            .map(|i| Observation::new(i as f64, (i as f64).cos()))
            .collect();
        let output = fit(
            &data,
            &Model::MovingAverage(MovingAverageParams { window_size: 1 }),
            AxisKind::Numeric,
        );
        assert_eq!(output.statistics.r2, 1.0);
        assert_eq!(output.statistics.rmse, 0.0);
    }

    #[test]
    fn date_axis_round_trips_to_caller_units() {
        // A season over 2021, sampled every 10 days.
        let base = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let season = scenario_a_params();
        let data: Vec<Observation> = (0..=20)
            .map(|i| {
                let day = i * 10;
                let date = base + chrono::Duration::days(day);
                let y = crate::models::double_logistic(day as f64, &season);
                Observation::from_date(date, y)
            })
            .collect();

        // Caller-side parameters carry epoch-millisecond locations.
        let origin_ms = Observation::from_date(base, 0.0).x;
        let params = DoubleLogisticParams {
            start: origin_ms + 50.0 * MS_PER_DAY,
            end: origin_ms + 150.0 * MS_PER_DAY,
            ..season
        };
        let output = fit(&data, &Model::DoubleLogistic(params), AxisKind::DateMillis);

        // Outputs are back in epoch milliseconds across the observed range.
        assert_eq!(output.curve.len(), 200);
        assert_eq!(output.curve[0].x, data[0].x);
        assert_eq!(output.curve[199].x, data[20].x);

        // The rates were authored per-day, so the normalized fit is exact.
        assert!(output.statistics.r2 > 0.999, "r2 = {}", output.statistics.r2);

        let sos = output.key_points.sos.unwrap();
        assert!(
            (sos.x - (origin_ms + 50.0 * MS_PER_DAY)).abs() < 1e-6,
            "sos x = {}",
            sos.x
        );
    }

    #[test]
    fn calibrate_model_returns_caller_units_and_improves_fit() {
        let data = scenario_a_data();
        let skewed = DoubleLogisticParams {
            start: 80.0,
            end: 120.0,
            ..scenario_a_params()
        };
        let initial = ParametricParams::DoubleLogistic(skewed);
        let locks = ParamLocks::none_for(&initial);

        let outcome = calibrate_model(&data, &initial, &locks, AxisKind::Numeric);
        let before = optimizer::mean_squared_error(&data, &initial.coords(), &|x, c| {
            predict(&initial.with_coords(c), x)
        });
        assert!(outcome.mse <= before);

        let ParametricParams::DoubleLogistic(p) = outcome.params else {
            panic!("family changed");
        };
        assert!(p.start < p.end);
    }

    #[test]
    fn fit_does_not_mutate_caller_data() {
        let data = scenario_a_data();
        let copy = data.clone();
        let _ = fit(
            &data,
            &Model::Loess(LoessParams { span: 0.8 }),
            AxisKind::Numeric,
        );
        assert_eq!(data, copy);
    }
}
