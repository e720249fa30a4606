//! Formatted run summaries.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{CurvePoint, FitOutput, Model};

/// Format a one-block plain-text summary of a fit run.
pub fn format_fit_summary(model: &Model, output: &FitOutput) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} fit ===\n", model.display_name()));
    out.push_str(&format!("Curve points: {}\n", output.curve.len()));
    out.push_str(&format!(
        "R2: {:.4} | RMSE: {:.4}\n",
        output.statistics.r2, output.statistics.rmse
    ));
    out.push_str(&format!(
        "SOS: {} | EOS: {} | Peak: {}\n",
        fmt_point(output.key_points.sos),
        fmt_point(output.key_points.eos),
        fmt_point(output.key_points.peak)
    ));
    for note in &output.notes {
        out.push_str(&format!("- note: {note}\n"));
    }

    out
}

fn fmt_point(point: Option<CurvePoint>) -> String {
    match point {
        Some(p) if p.x.is_finite() && p.y.is_finite() => {
            format!("(x={:.3}, y={:.3})", p.x, p.y)
        }
        _ => "-".to_string(),
    }
}
