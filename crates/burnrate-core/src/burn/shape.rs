//! Curve shape analysis
//!
//! Short windows are noisy and long windows converge. The flat boundary is
//! where adjacent windows stop disagreeing; everything left of it is signal.

use serde::Serialize;

use super::window::CurvePoint;
use crate::config::{ShapeConfig, WindowConfig};

/// Direction of spending relative to target over the signal region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendArrow {
    /// Deviation shrinking toward target
    Improving,
    Worsening,
    Stable,
    /// Not enough signal to call it
    Neutral,
}

impl TrendArrow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Worsening => "worsening",
            Self::Stable => "stable",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for TrendArrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of analyzing one curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveShape {
    pub flat_boundary: i64,
    pub visible_range: [i64; 2],
    pub arrow: TrendArrow,
}

impl CurveShape {
    pub fn analyze(curve: &[CurvePoint], shape: &ShapeConfig, windows: &WindowConfig) -> Self {
        let max_window = curve.last().map(|p| p.window).unwrap_or(windows.max);
        let flat_boundary = detect_flat_boundary(
            curve,
            shape.flat_threshold,
            shape.flat_consecutive,
            max_window,
        );
        let start = curve.first().map(|p| p.window).unwrap_or(windows.min);

        Self {
            flat_boundary,
            visible_range: visible_range(flat_boundary, start, max_window, shape.min_visible),
            arrow: trend_arrow(curve, flat_boundary, shape.trend_points, shape.trend_slope),
        }
    }
}

/// Window at which the curve first goes flat.
///
/// Scans groups of `consecutive` adjacent points from the smallest window up;
/// a group is flat when every adjacent pair differs by less than `threshold`.
/// Returns `max_window` when no group is flat, including curves shorter than
/// one group.
pub fn detect_flat_boundary(
    curve: &[CurvePoint],
    threshold: f64,
    consecutive: usize,
    max_window: i64,
) -> i64 {
    curve
        .windows(consecutive.max(1))
        .find(|group| {
            group
                .windows(2)
                .all(|pair| (pair[1].daily_rate - pair[0].daily_rate).abs() < threshold)
        })
        .map(|group| group[0].window)
        .unwrap_or(max_window)
}

/// Recommended `[start, end]` chart range.
///
/// Extends past the flat boundary by half the signal span, then widens to
/// `min_visible` days if needed. Never exceeds `max_window`.
pub fn visible_range(flat_boundary: i64, start: i64, max_window: i64, min_visible: i64) -> [i64; 2] {
    let signal_days = flat_boundary - start;
    let mut end = max_window.min(flat_boundary + signal_days.max(0) / 2);
    if end - start < min_visible {
        end = max_window.min(start + min_visible);
    }
    [start, end]
}

/// Trend of deviation over the last `points` windows up to the flat boundary
pub fn trend_arrow(
    curve: &[CurvePoint],
    flat_boundary: i64,
    points: usize,
    slope_threshold: f64,
) -> TrendArrow {
    let signal: Vec<f64> = curve
        .iter()
        .filter(|p| p.window <= flat_boundary)
        .map(|p| p.deviation)
        .collect();

    let points = points.max(2);
    if signal.len() < points {
        return TrendArrow::Neutral;
    }

    let tail = &signal[signal.len() - points..];
    let slope = (tail[points - 1] - tail[0]) / (points - 1) as f64;

    if slope < -slope_threshold {
        TrendArrow::Improving
    } else if slope > slope_threshold {
        TrendArrow::Worsening
    } else {
        TrendArrow::Stable
    }
}
