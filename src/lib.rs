//! `pheno-curves` library crate.
//!
//! Fits a smooth seasonal trajectory (a "phenological curve") to noisy,
//! irregularly-timed scalar observations and derives landmarks from the fit:
//! start of season, end of season, and peak, plus goodness-of-fit statistics.
//!
//! The crate is a pure in-process engine:
//!
//! - callers supply observations, a model variant, and (for calibration) locks
//! - the engine returns a fitted curve, key points, and statistics
//! - no global state, no I/O, no background threads
//!
//! Ingestion, rendering, parameter editing, and export all live with the
//! caller; this crate's boundary is plain function calls over the types in
//! [`domain`].

pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod report;
pub mod smooth;
