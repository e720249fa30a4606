//! Savitzky-Golay smoother (local polynomial regression).
//!
//! Each point gets a least-squares polynomial fit over a centered window,
//! solved through the normal equations; the constant term of the local fit is
//! the smoothed value (the design is built in powers of `x_j - x_i`, so the
//! constant term *is* the fitted value at the center point).
//!
//! Failure policy:
//! - invalid configuration (even window, window not larger than the order,
//!   order above the closed-form inversion bound, dataset shorter than the
//!   window) falls back to [`moving_average`] with the same window size
//! - a singular or degenerate window falls back to that point's raw value;
//!   the rest of the fit still completes

use nalgebra::DMatrix;

use crate::domain::{CurvePoint, Observation};
use crate::math::{invert, multiply, transpose};
use crate::smooth::moving_average;

/// Maximum polynomial order supported by the closed-form 3x3 inversion.
pub const MAX_POLY_ORDER: usize = 2;

/// Whether the configuration supports a genuine Savitzky-Golay pass.
pub fn savgol_config_is_valid(len: usize, window_size: usize, poly_order: usize) -> bool {
    window_size % 2 == 1
        && window_size > poly_order
        && poly_order <= MAX_POLY_ORDER
        && len >= window_size
}

/// Smooth `data` with a Savitzky-Golay filter of the given window and
/// polynomial order.
///
/// Falls back to a moving average with the same window when
/// [`savgol_config_is_valid`] rejects the configuration.
pub fn savitzky_golay(data: &[Observation], window_size: usize, poly_order: usize) -> Vec<CurvePoint> {
    if !savgol_config_is_valid(data.len(), window_size, poly_order) {
        return moving_average(data, window_size);
    }

    let n = data.len();
    let half = window_size / 2;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(n - 1);
        let window = &data[lo..=hi];
        let y = local_poly_value(window, data[i].x, poly_order).unwrap_or(data[i].y);
        out.push(CurvePoint { x: data[i].x, y });
    }
    out
}

/// Constant term of the least-squares polynomial over `window`, centered at
/// `x_center`; `None` when the window geometry is degenerate or the normal
/// equations are singular.
fn local_poly_value(window: &[Observation], x_center: f64, poly_order: usize) -> Option<f64> {
    let rows = window.len();
    let cols = poly_order + 1;
    if rows < cols {
        return None;
    }

    // Vandermonde design in powers of (x_j - x_center).
    let mut design = DMatrix::zeros(rows, cols);
    let mut observed = DMatrix::zeros(rows, 1);
    for (r, o) in window.iter().enumerate() {
        let dx = o.x - x_center;
        let mut power = 1.0;
        for c in 0..cols {
            design[(r, c)] = power;
            power *= dx;
        }
        observed[(r, 0)] = o.y;
    }

    // Normal equations: coeffs = (X^T X)^-1 X^T Y.
    let design_t = transpose(&design);
    let normal = multiply(&design_t, &design)?;
    let normal_inv = invert(&normal)?;
    let moment = multiply(&design_t, &observed)?;
    let coeffs = multiply(&normal_inv, &moment)?;

    let value = coeffs[(0, 0)];
    value.is_finite().then_some(value)
}
