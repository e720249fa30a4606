//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - serialized by the caller's export layer without adapters
//! - reloaded later for plotting or comparisons

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Milliseconds per day; conversion factor for date-axis normalization.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// How observation x values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Plain numeric axis; values are used as-is.
    Numeric,
    /// Date axis encoded as epoch milliseconds.
    ///
    /// Internally normalized to days since the dataset minimum before any
    /// modeling; all outputs are converted back to epoch milliseconds.
    DateMillis,
}

/// A single scalar observation.
///
/// Datasets are ordered by `x` (ties allowed) and must contain no NaN or
/// infinite values; [`validate_observations`] lets callers check both before
/// fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// X position in caller units (epoch milliseconds for date axes).
    pub x: f64,
    /// Measured value.
    pub y: f64,
    /// Optional caller-supplied label, carried through untouched.
    pub label: Option<String>,
}

impl Observation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    /// Build a date-axis observation; `x` becomes the epoch-millisecond
    /// timestamp of `date` at midnight UTC.
    pub fn from_date(date: NaiveDate, y: f64) -> Self {
        let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        Self::new(millis as f64, y)
    }

    /// Build a date-axis observation from a full timestamp.
    pub fn from_datetime(at: DateTime<Utc>, y: f64) -> Self {
        Self::new(at.timestamp_millis() as f64, y)
    }
}

/// Check that `data` is fit-ready: finite values, ascending x.
///
/// The engine itself never rejects data (it degrades gracefully instead);
/// this helper exists so ingestion code can surface problems to the user
/// before a fit is requested.
pub fn validate_observations(data: &[Observation]) -> Result<(), EngineError> {
    for (i, o) in data.iter().enumerate() {
        if !(o.x.is_finite() && o.y.is_finite()) {
            return Err(EngineError::new(format!(
                "Observation {i} contains a non-finite value (x={}, y={}).",
                o.x, o.y
            )));
        }
    }
    for (i, pair) in data.windows(2).enumerate() {
        if pair[1].x < pair[0].x {
            return Err(EngineError::new(format!(
                "Observations must be ordered by ascending x (violated at index {}).",
                i + 1
            )));
        }
    }
    Ok(())
}

/// Parameters of the double logistic seasonal curve.
///
/// `y = baseline + amplitude * sigmoid(growth_rate * (x - start))
///    * (1 - sigmoid(senescence_rate * (x - end)))`
///
/// A rise controlled by `growth_rate`/`start` and a fall controlled by
/// `senescence_rate`/`end` around a plateau of `baseline + amplitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleLogisticParams {
    /// Off-season background level.
    pub baseline: f64,
    /// Plateau height above the baseline.
    pub amplitude: f64,
    /// X location of the green-up inflection (caller axis units).
    pub start: f64,
    /// X location of the senescence inflection (caller axis units).
    pub end: f64,
    /// Steepness of the rising limb.
    pub growth_rate: f64,
    /// Steepness of the falling limb.
    pub senescence_rate: f64,
}

/// Parameters of the single (monotonic-rise) logistic curve.
///
/// `y = max_value / (1 + exp(-steepness * (x - midpoint)))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleLogisticParams {
    /// Upper asymptote (`L`).
    pub max_value: f64,
    /// Steepness of the rise (`k`).
    pub steepness: f64,
    /// X location of the half-maximum (`x0`, caller axis units).
    pub midpoint: f64,
}

/// LOESS smoother configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoessParams {
    /// Fraction of the dataset included in each local window (0..=1).
    pub span: f64,
}

/// Moving-average smoother configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageParams {
    /// Centered window size in points; `< 1` is a passthrough.
    pub window_size: usize,
}

/// Savitzky-Golay smoother configuration.
///
/// `window_size` must be odd and larger than `poly_order`, `poly_order` must
/// be at most 2 (the closed-form inversion bound), and the dataset must have
/// at least `window_size` points; otherwise the smoother falls back to a
/// moving average with the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavitzkyGolayParams {
    pub window_size: usize,
    pub poly_order: usize,
}

impl SavitzkyGolayParams {
    /// Standard configuration: the given window with a quadratic local fit.
    pub fn with_window(window_size: usize) -> Self {
        Self {
            window_size,
            poly_order: 2,
        }
    }
}

/// Parameters of a calibratable (parametric) model family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParametricParams {
    DoubleLogistic(DoubleLogisticParams),
    SingleLogistic(SingleLogisticParams),
}

impl ParametricParams {
    /// Human-readable label for summaries.
    pub fn display_name(&self) -> &'static str {
        match self {
            ParametricParams::DoubleLogistic(_) => "Double logistic",
            ParametricParams::SingleLogistic(_) => "Single logistic",
        }
    }

    /// Flatten to the coordinate vector the optimizer works on.
    ///
    /// Order: double logistic `[baseline, amplitude, start, end, growth_rate,
    /// senescence_rate]`; single logistic `[max_value, steepness, midpoint]`.
    pub fn coords(&self) -> Vec<f64> {
        match self {
            ParametricParams::DoubleLogistic(p) => vec![
                p.baseline,
                p.amplitude,
                p.start,
                p.end,
                p.growth_rate,
                p.senescence_rate,
            ],
            ParametricParams::SingleLogistic(p) => vec![p.max_value, p.steepness, p.midpoint],
        }
    }

    /// Rebuild parameters of the same family from a [`coords`](Self::coords)
    /// vector.
    ///
    /// # Panics
    /// Panics if `coords` does not have this family's coordinate count.
    /// Callers should size the slice from [`coords`](Self::coords).
    pub fn with_coords(&self, coords: &[f64]) -> Self {
        match self {
            ParametricParams::DoubleLogistic(_) => {
                ParametricParams::DoubleLogistic(DoubleLogisticParams {
                    baseline: coords[0],
                    amplitude: coords[1],
                    start: coords[2],
                    end: coords[3],
                    growth_rate: coords[4],
                    senescence_rate: coords[5],
                })
            }
            ParametricParams::SingleLogistic(_) => {
                ParametricParams::SingleLogistic(SingleLogisticParams {
                    max_value: coords[0],
                    steepness: coords[1],
                    midpoint: coords[2],
                })
            }
        }
    }
}

/// Model selector with its owned parameters.
///
/// A closed sum type: each variant carries exactly the parameters that are
/// meaningful for it, so an unsupported parameter is unrepresentable rather
/// than a silently ignored map entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Model {
    DoubleLogistic(DoubleLogisticParams),
    SingleLogistic(SingleLogisticParams),
    Loess(LoessParams),
    MovingAverage(MovingAverageParams),
    SavitzkyGolay(SavitzkyGolayParams),
}

impl Model {
    /// Human-readable label for terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Model::DoubleLogistic(_) => "Double logistic",
            Model::SingleLogistic(_) => "Single logistic",
            Model::Loess(_) => "LOESS",
            Model::MovingAverage(_) => "Moving average",
            Model::SavitzkyGolay(_) => "Savitzky-Golay",
        }
    }

    /// The parametric parameters, when this variant is calibratable.
    pub fn as_parametric(&self) -> Option<ParametricParams> {
        match self {
            Model::DoubleLogistic(p) => Some(ParametricParams::DoubleLogistic(*p)),
            Model::SingleLogistic(p) => Some(ParametricParams::SingleLogistic(*p)),
            _ => None,
        }
    }
}

/// Per-parameter optimization locks for the double logistic family.
///
/// A locked parameter is excluded from optimization entirely; the optimizer
/// never writes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleLogisticLocks {
    pub baseline: bool,
    pub amplitude: bool,
    pub start: bool,
    pub end: bool,
    pub growth_rate: bool,
    pub senescence_rate: bool,
}

/// Per-parameter optimization locks for the single logistic family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleLogisticLocks {
    pub max_value: bool,
    pub steepness: bool,
    pub midpoint: bool,
}

/// Lock set matching a parametric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamLocks {
    DoubleLogistic(DoubleLogisticLocks),
    SingleLogistic(SingleLogisticLocks),
}

impl ParamLocks {
    /// An all-unlocked lock set for the family of `params`.
    pub fn none_for(params: &ParametricParams) -> Self {
        match params {
            ParametricParams::DoubleLogistic(_) => {
                ParamLocks::DoubleLogistic(DoubleLogisticLocks::default())
            }
            ParametricParams::SingleLogistic(_) => {
                ParamLocks::SingleLogistic(SingleLogisticLocks::default())
            }
        }
    }

    /// Flatten to a mask in [`ParametricParams::coords`] order.
    pub fn mask(&self) -> Vec<bool> {
        match self {
            ParamLocks::DoubleLogistic(l) => vec![
                l.baseline,
                l.amplitude,
                l.start,
                l.end,
                l.growth_rate,
                l.senescence_rate,
            ],
            ParamLocks::SingleLogistic(l) => vec![l.max_value, l.steepness, l.midpoint],
        }
    }
}

/// One point of a fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Phenological landmarks derived from a fitted curve.
///
/// Any landmark can be absent (e.g. too few fitted points to derive one).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPoints {
    /// Start of season.
    pub sos: Option<CurvePoint>,
    /// End of season.
    pub eos: Option<CurvePoint>,
    /// Seasonal maximum.
    pub peak: Option<CurvePoint>,
}

/// Goodness-of-fit summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Coefficient of determination; 1 for a perfect fit, 0 when undefined.
    pub r2: f64,
    /// Root mean squared error; 0 when undefined.
    pub rmse: f64,
}

/// Everything one fit invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutput {
    /// Fitted curve: 200 grid samples for parametric models, one point per
    /// input observation for smoothers.
    pub curve: Vec<CurvePoint>,
    pub key_points: KeyPoints,
    pub statistics: FitStatistics,
    /// Diagnostics recorded when a silent fallback or repair fired.
    /// Empty on a clean fit; never affects the numeric outputs.
    pub notes: Vec<String>,
}

impl FitOutput {
    /// The "no fit" result used for empty inputs.
    pub fn empty() -> Self {
        Self {
            curve: Vec::new(),
            key_points: KeyPoints::default(),
            statistics: FitStatistics::default(),
            notes: Vec::new(),
        }
    }
}

/// Result of one calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    /// Calibrated parameters, in the same axis units as the input data.
    pub params: ParametricParams,
    /// Mean squared error of `params` against the data (normalized axis).
    pub mse: f64,
    /// Diagnostics (constraint repairs, ignored lock sets).
    pub notes: Vec<String>,
}
