//! Burn rate curve engine
//!
//! Turns a stream of dated expenses into a family of decay-weighted daily
//! spending rates, one per lookback window, then reads the shape of that
//! family to pick a chart range and a trend arrow.
//!
//! - `decay` - intensity dial to half-life, recency weights
//! - `window` - per-window weighted daily rate
//! - `shape` - flat boundary, visible range, trend arrow
//! - `target` - exponential smoothing of group targets on feedback
//! - `engine` - per-group orchestration over a [`BurnRateStore`]

pub mod decay;
pub mod engine;
pub mod shape;
pub mod target;
pub mod window;

pub use decay::{clamp_intensity, half_life, weight};
pub use engine::{
    BurnRateEngine, BurnRateReport, BurnRateStore, FeedbackOutcome, GroupBurnRate, PoolFilter,
    INTENSITY_SETTING,
};
pub use shape::{detect_flat_boundary, trend_arrow, visible_range, CurveShape, TrendArrow};
pub use target::{adjust_target, TargetAdjustment};
pub use window::{build_curve, round2, window_rate, CurvePoint, PoolEntry};
