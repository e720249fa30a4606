//! Seasonal model evaluation for the parametric families.
//!
//! Models are implemented as small, pure functions so that fitting/search code
//! can stay generic.

pub mod model;

pub use model::*;
