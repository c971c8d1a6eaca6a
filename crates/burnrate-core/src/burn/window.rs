//! Decay-weighted daily rate per lookback window

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::decay::weight;

/// One expense in a group's lookback pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolEntry {
    pub date: NaiveDate,
    /// Signed amount as stored (expenses are negative)
    pub amount: f64,
    pub category_id: Option<i64>,
}

/// A single point on a burn rate curve.
///
/// Values are kept at full precision; they are rounded to cents only when
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub window: i64,
    #[serde(serialize_with = "serialize_cents")]
    pub daily_rate: f64,
    #[serde(serialize_with = "serialize_cents")]
    pub deviation: f64,
}

/// Round to 2 decimal places, normalizing negative zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

fn serialize_cents<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value))
}

/// Weighted daily rate for a single window of `window` days ending at `today`.
///
/// Entries dated in `[today - window, today]` contribute their magnitude
/// times their recency weight. The sum is spread over the window length,
/// not divided by the weight total. A window with no weight is zero.
pub fn window_rate(pool: &[PoolEntry], today: NaiveDate, half_life: f64, window: i64) -> f64 {
    let mut total_weighted = 0.0;
    let mut total_weight = 0.0;

    for entry in pool {
        let days_ago = (today - entry.date).num_days();
        if !(0..=window).contains(&days_ago) {
            continue;
        }
        // Range check above keeps this in u32
        let w = weight(days_ago as u32, half_life);
        total_weighted += entry.amount.abs() * w;
        total_weight += w;
    }

    if total_weight > 0.0 {
        total_weighted / window as f64
    } else {
        0.0
    }
}

/// Build the curve for every window in `windows`, in increasing order
pub fn build_curve(
    pool: &[PoolEntry],
    today: NaiveDate,
    half_life: f64,
    target: f64,
    windows: RangeInclusive<i64>,
) -> Vec<CurvePoint> {
    windows
        .map(|window| {
            let daily_rate = window_rate(pool, today, half_life, window);
            CurvePoint {
                window,
                daily_rate,
                deviation: daily_rate - target,
            }
        })
        .collect()
}
