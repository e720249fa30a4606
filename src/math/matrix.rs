//! Small dense-matrix helpers for the Savitzky-Golay normal equations.
//!
//! Inversion is closed-form (explicit cofactors) for 1x1 through 3x3 only.
//! This is a deliberate scope limit: the supported polynomial order is capped
//! at 2, so the normal-equations matrix is never larger than 3x3. `invert`
//! returns `None` on singular or unsupported input instead of reaching for an
//! iterative solver.

use nalgebra::DMatrix;

/// Transpose of `m`.
pub fn transpose(m: &DMatrix<f64>) -> DMatrix<f64> {
    m.transpose()
}

/// Matrix product `a * b`, or `None` when the inner dimensions disagree.
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if a.ncols() != b.nrows() {
        return None;
    }
    Some(a * b)
}

/// Closed-form inverse of a square matrix up to 3x3.
///
/// Returns `None` for non-square input, dimensions above 3, and singular
/// matrices (zero or non-finite determinant).
pub fn invert(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if m.nrows() != m.ncols() {
        return None;
    }
    match m.nrows() {
        1 => invert_1x1(m),
        2 => invert_2x2(m),
        3 => invert_3x3(m),
        _ => None,
    }
}

fn det_is_usable(det: f64) -> bool {
    det != 0.0 && det.is_finite()
}

fn invert_1x1(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let det = m[(0, 0)];
    if !det_is_usable(det) {
        return None;
    }
    Some(DMatrix::from_element(1, 1, 1.0 / det))
}

fn invert_2x2(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (a, b, c, d) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let det = a * d - b * c;
    if !det_is_usable(det) {
        return None;
    }
    Some(DMatrix::from_row_slice(2, 2, &[
        d / det,
        -b / det,
        -c / det,
        a / det,
    ]))
}

fn invert_3x3(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (a, b, c) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (d, e, f) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (g, h, i) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);

    let det = a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g);
    if !det_is_usable(det) {
        return None;
    }

    // Adjugate over determinant, written out cofactor by cofactor.
    Some(DMatrix::from_row_slice(3, 3, &[
        (e * i - f * h) / det,
        (c * h - b * i) / det,
        (b * f - c * e) / det,
        (f * g - d * i) / det,
        (a * i - c * g) / det,
        (c * d - a * f) / det,
        (d * h - e * g) / det,
        (b * g - a * h) / det,
        (a * e - b * d) / det,
    ]))
}
