//! Key-point derivation: start of season (SOS), end of season (EOS), peak.
//!
//! Key points are derived from the *fitted* curve, never from the raw
//! observations; a noisy spike in the input therefore cannot become the peak.

use crate::domain::{CurvePoint, KeyPoints};

/// The maximum-y point of `curve` (the first one on ties), if any.
pub fn peak_point(curve: &[CurvePoint]) -> Option<CurvePoint> {
    let mut best: Option<CurvePoint> = None;
    for p in curve {
        match best {
            Some(b) if p.y > b.y => best = Some(*p),
            None => best = Some(*p),
            _ => {}
        }
    }
    best
}

/// Key points for a monotonic single logistic sampled on `curve`.
///
/// SOS/EOS are the first grid points at 10% / 90% of the asymptote `l`.
pub fn single_logistic_key_points(curve: &[CurvePoint], l: f64) -> KeyPoints {
    KeyPoints {
        sos: curve.iter().find(|p| p.y >= 0.1 * l).copied(),
        eos: curve.iter().find(|p| p.y >= 0.9 * l).copied(),
        peak: peak_point(curve),
    }
}

/// Shared key-point derivation for smoothed (non-parametric) curves.
///
/// The baseline is the mean of the first and last fitted values and the
/// amplitude is the peak above that baseline. SOS is the first point scanning
/// forward (up to the peak) at 20% of the amplitude; EOS is the first point
/// scanning backward from the end (down to the peak) at 50%. A missing
/// crossing falls back to the first/last fitted point. Fewer than three
/// fitted points yield no key points.
pub fn smoothed_key_points(curve: &[CurvePoint]) -> KeyPoints {
    if curve.len() < 3 {
        return KeyPoints::default();
    }

    let mut peak_idx = 0;
    for (i, p) in curve.iter().enumerate() {
        if p.y > curve[peak_idx].y {
            peak_idx = i;
        }
    }
    let peak = curve[peak_idx];

    let baseline = (curve[0].y + curve[curve.len() - 1].y) / 2.0;
    let amplitude = peak.y - baseline;
    let sos_threshold = baseline + 0.2 * amplitude;
    let eos_threshold = baseline + 0.5 * amplitude;

    let sos = curve[..=peak_idx]
        .iter()
        .find(|p| p.y >= sos_threshold)
        .copied()
        .or(Some(curve[0]));
    let eos = curve[peak_idx..]
        .iter()
        .rev()
        .find(|p| p.y >= eos_threshold)
        .copied()
        .or(Some(curve[curve.len() - 1]));

    KeyPoints {
        sos,
        eos,
        peak: Some(peak),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(values: &[(f64, f64)]) -> Vec<CurvePoint> {
        values.iter().map(|&(x, y)| CurvePoint { x, y }).collect()
    }

    #[test]
    fn peak_is_the_first_maximum() {
        let c = curve(&[(0.0, 1.0), (1.0, 3.0), (2.0, 3.0), (3.0, 2.0)]);
        let peak = peak_point(&c).unwrap();
        assert_eq!(peak.x, 1.0);
        assert_eq!(peak.y, 3.0);
        assert!(peak_point(&[]).is_none());
    }

    #[test]
    fn single_logistic_thresholds_pick_grid_points() {
        // A rising ramp standing in for the sampled logistic.
        let c: Vec<CurvePoint> = (0..=10)
            .map(|i| CurvePoint {
                x: i as f64,
                y: i as f64 / 10.0,
            })
            .collect();
        let kp = single_logistic_key_points(&c, 1.0);
        assert_eq!(kp.sos.unwrap().x, 1.0); // first y >= 0.1
        assert_eq!(kp.eos.unwrap().x, 9.0); // first y >= 0.9
        assert_eq!(kp.peak.unwrap().x, 10.0);
    }

    #[test]
    fn smoothed_derivation_finds_rise_and_fall() {
        // Symmetric hump: baseline 0, peak 1 at x = 3.
        let c = curve(&[
            (0.0, 0.0),
            (1.0, 0.1),
            (2.0, 0.6),
            (3.0, 1.0),
            (4.0, 0.7),
            (5.0, 0.3),
            (6.0, 0.0),
        ]);
        let kp = smoothed_key_points(&c);
        assert_eq!(kp.peak.unwrap().x, 3.0);
        // baseline = 0, amplitude = 1: sos at first y >= 0.2, eos at the
        // last point (scanning back from the end) with y >= 0.5.
        assert_eq!(kp.sos.unwrap().x, 2.0);
        assert_eq!(kp.eos.unwrap().x, 4.0);
    }

    #[test]
    fn missing_crossings_fall_back_to_curve_ends() {
        // Monotonically falling: the peak is the first point, so both scans
        // collapse onto it.
        let c = curve(&[(0.0, 1.0), (1.0, 0.4), (2.0, 0.0)]);
        let kp = smoothed_key_points(&c);
        assert_eq!(kp.peak.unwrap().x, 0.0);
        assert_eq!(kp.sos.unwrap().x, 0.0);
        // Backward scan: y(2) = 0 < 0.75, y(1) = 0.4 < 0.75, y(0) = 1.0 >= 0.75.
        assert_eq!(kp.eos.unwrap().x, 0.0);
    }

    #[test]
    fn fewer_than_three_points_yield_nothing() {
        let c = curve(&[(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(smoothed_key_points(&c), KeyPoints::default());
    }
}
