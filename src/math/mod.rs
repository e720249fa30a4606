//! Mathematical utilities: logistic primitives and small dense-matrix helpers.

pub mod logistic;
pub mod matrix;

pub use logistic::*;
pub use matrix::*;
