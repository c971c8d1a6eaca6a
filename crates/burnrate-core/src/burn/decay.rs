//! Exponential recency weighting

use std::f64::consts::LN_2;

use crate::config::DecayConfig;

/// Clamp an intensity dial value into `[0, 1]`
pub fn clamp_intensity(intensity: f64) -> f64 {
    intensity.clamp(0.0, 1.0)
}

/// Half-life in days for an intensity in `[0, 1]`.
///
/// Interpolates linearly from the gentle half-life at 0 down to the
/// responsive half-life at 1. Out-of-range input is clamped first.
pub fn half_life(intensity: f64, decay: &DecayConfig) -> f64 {
    let intensity = clamp_intensity(intensity);
    decay.gentle_half_life - (decay.gentle_half_life - decay.responsive_half_life) * intensity
}

/// Weight of a transaction `days_ago` days old: `exp(-ln2 / half_life * days_ago)`.
///
/// `half_life` must be positive; callers get it from a validated config.
pub fn weight(days_ago: u32, half_life: f64) -> f64 {
    debug_assert!(half_life > 0.0, "half_life must be positive");
    (-(LN_2 / half_life) * f64::from(days_ago)).exp()
}
