//! Synthetic seasonal sample generation.
//!
//! Deterministic (seeded) noisy seasons around a reference double logistic,
//! for tests, demos, and callers that want plausible data before wiring up
//! real ingestion.

use chrono::{NaiveDate, NaiveTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DoubleLogisticParams, MS_PER_DAY, Observation};
use crate::error::EngineError;
use crate::models::double_logistic;

/// Configuration for one synthetic season.
#[derive(Debug, Clone)]
pub struct SeasonSpec {
    /// Reference curve the noisy samples are drawn around.
    pub curve: DoubleLogisticParams,
    /// Number of observations (evenly stepped over the x range).
    pub count: usize,
    /// X range start, in curve units (day offsets for dated seasons).
    pub x_min: f64,
    /// X range end (inclusive).
    pub x_max: f64,
    /// Standard deviation of the Gaussian noise added to each y.
    pub noise_sigma: f64,
    /// RNG seed; identical specs generate identical samples.
    pub seed: u64,
}

/// Generate a numeric-axis season from `spec`.
pub fn generate_season(spec: &SeasonSpec) -> Result<Vec<Observation>, EngineError> {
    if spec.count == 0 {
        return Err(EngineError::new("Sample count must be > 0."));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_max >= spec.x_min) {
        return Err(EngineError::new(format!(
            "Invalid x range: [{}, {}].",
            spec.x_min, spec.x_max
        )));
    }
    if !(spec.noise_sigma.is_finite() && spec.noise_sigma >= 0.0) {
        return Err(EngineError::new("Noise sigma must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise_sigma)
        .map_err(|e| EngineError::new(format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(spec.count);
    for i in 0..spec.count {
        let u = if spec.count == 1 {
            0.0
        } else {
            i as f64 / (spec.count as f64 - 1.0)
        };
        let x = spec.x_min + u * (spec.x_max - spec.x_min);
        let y = double_logistic(x, &spec.curve) + normal.sample(&mut rng);
        out.push(Observation::new(x, y));
    }
    Ok(out)
}

/// Generate a date-axis season: `spec`'s x range is interpreted as day
/// offsets from `start_date`, and each observation's x becomes the
/// corresponding epoch-millisecond timestamp.
pub fn generate_dated_season(
    spec: &SeasonSpec,
    start_date: NaiveDate,
) -> Result<Vec<Observation>, EngineError> {
    let season = generate_season(spec)?;
    let start_ms = start_date
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_millis() as f64;
    Ok(season
        .into_iter()
        .map(|o| Observation {
            x: start_ms + o.x * MS_PER_DAY,
            ..o
        })
        .collect())
}
