//! Data-driven (non-parametric) curve estimators.
//!
//! All smoothers are *interpolating*: they receive the observation sequence
//! sorted ascending by `x` (the orchestrator guarantees this) and return one
//! fitted point per input, in the same order and at the same `x` positions.

pub mod loess;
pub mod moving_average;
pub mod savgol;

pub use loess::*;
pub use moving_average::*;
pub use savgol::*;
