//! Per-group burn rate orchestration
//!
//! The engine borrows a store for the duration of one request. It reads
//! targets, the intensity setting, category membership and the expense pool,
//! and writes only on feedback and intensity changes.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::decay::{clamp_intensity, half_life};
use super::shape::{CurveShape, TrendArrow};
use super::target::adjust_target;
use super::window::{build_curve, round2, CurvePoint, PoolEntry};
use crate::config::BurnRateConfig;
use crate::error::{Error, Result};
use crate::models::{FeedbackRecord, Sentiment, SpendingGroup};

/// Settings key holding the persisted intensity dial
pub const INTENSITY_SETTING: &str = "curve_intensity";

/// Which expenses a group's pool admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolFilter {
    /// Negative amounts that are neither recurring nor explosion-flagged
    Regular,
    /// Negative amounts in the group's categories, plus explosion-flagged
    /// expenses from any category
    Explosion,
}

impl PoolFilter {
    pub fn for_group(group: SpendingGroup) -> Self {
        match group {
            SpendingGroup::Explosion => Self::Explosion,
            _ => Self::Regular,
        }
    }
}

/// Storage operations the engine depends on
pub trait BurnRateStore {
    fn get_target(&self, group: SpendingGroup) -> Result<Option<f64>>;
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    fn list_category_ids(&self, group: SpendingGroup) -> Result<Vec<i64>>;
    /// Expenses dated within `[from, to]` admitted by `filter`
    fn query_transactions(
        &self,
        category_ids: &[i64],
        from: NaiveDate,
        to: NaiveDate,
        filter: PoolFilter,
    ) -> Result<Vec<PoolEntry>>;
    /// Append a feedback record and, when given, store the group's new
    /// target. Both writes land or neither does.
    fn record_feedback(&self, record: &FeedbackRecord, new_target: Option<f64>) -> Result<()>;
}

/// Burn rate payload for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBurnRate {
    pub curve: Vec<CurvePoint>,
    pub target: f64,
    pub arrow: TrendArrow,
    pub current_reference_rate: f64,
    pub visible_range: [i64; 2],
    pub flat_boundary: i64,
    pub intensity: f64,
}

/// Burn rate payload for every group, keyed by group name
pub type BurnRateReport = BTreeMap<SpendingGroup, GroupBurnRate>;

/// Result of submitting feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackOutcome {
    pub new_target: Option<f64>,
    pub rate_at_feedback: f64,
}

pub struct BurnRateEngine<'a, S: BurnRateStore + ?Sized> {
    store: &'a S,
    config: &'a BurnRateConfig,
}

impl<'a, S: BurnRateStore + ?Sized> BurnRateEngine<'a, S> {
    pub fn new(store: &'a S, config: &'a BurnRateConfig) -> Self {
        Self { store, config }
    }

    /// Compute the burn rate for every group
    pub fn compute(&self, requested_intensity: Option<f64>, today: NaiveDate) -> Result<BurnRateReport> {
        let intensity = self.resolve_intensity(requested_intensity)?;

        let mut report = BTreeMap::new();
        for group in SpendingGroup::ALL {
            report.insert(group, self.compute_group(group, intensity, today)?);
        }
        Ok(report)
    }

    /// Compute one group's curve at an already-resolved intensity
    pub fn compute_group(
        &self,
        group: SpendingGroup,
        intensity: f64,
        today: NaiveDate,
    ) -> Result<GroupBurnRate> {
        let intensity = clamp_intensity(intensity);
        let half_life = half_life(intensity, &self.config.decay);
        let target = self.target_for(group)?;
        let windows = &self.config.windows;

        let filter = PoolFilter::for_group(group);
        let category_ids = self.store.list_category_ids(group)?;
        let curve = if category_ids.is_empty() && filter == PoolFilter::Regular {
            debug!(group = %group, "No categories mapped, skipping curve");
            Vec::new()
        } else {
            let from = today - Duration::days(windows.max);
            let pool = self.store.query_transactions(
                &category_ids,
                from,
                today,
                filter,
            )?;
            debug!(group = %group, pool = pool.len(), half_life, "Building burn rate curve");
            build_curve(&pool, today, half_life, target, windows.min..=windows.max)
        };

        let shape = CurveShape::analyze(&curve, &self.config.shape, windows);
        let current_reference_rate = curve
            .iter()
            .find(|p| p.window == windows.reference)
            .map(|p| round2(p.daily_rate))
            .unwrap_or(0.0);

        Ok(GroupBurnRate {
            curve,
            target: round2(target),
            arrow: shape.arrow,
            current_reference_rate,
            visible_range: shape.visible_range,
            flat_boundary: shape.flat_boundary,
            intensity,
        })
    }

    /// Record feedback for a group and nudge its target on "good".
    ///
    /// Group and sentiment are validated before anything is written.
    pub fn submit_feedback(
        &self,
        group: &str,
        sentiment: &str,
        today: NaiveDate,
    ) -> Result<FeedbackOutcome> {
        let group: SpendingGroup = group.parse().map_err(Error::Validation)?;
        if !group.is_adaptive() {
            return Err(Error::Validation(format!(
                "group '{}' does not accept feedback",
                group
            )));
        }
        let sentiment: Sentiment = sentiment.parse().map_err(Error::Validation)?;

        let intensity = self.stored_intensity()?;
        let current = self.compute_group(group, intensity, today)?;
        let old_target = self.target_for(group)?;

        let adjustment = adjust_target(
            group,
            old_target,
            current.current_reference_rate,
            sentiment,
            self.config.smoothing,
            today,
        )?;

        self.store
            .record_feedback(&adjustment.record, adjustment.new_target)?;
        if let Some(new_target) = adjustment.new_target {
            info!(group = %group, old_target, new_target, "Target adjusted from feedback");
        }

        Ok(FeedbackOutcome {
            new_target: adjustment.new_target,
            rate_at_feedback: adjustment.record.rate_at_feedback,
        })
    }

    /// Request intensity when given, else the stored setting, else the default.
    /// Finite values are clamped to `[0, 1]`.
    pub fn resolve_intensity(&self, requested: Option<f64>) -> Result<f64> {
        match requested {
            Some(value) if !value.is_finite() => Err(Error::Validation(format!(
                "intensity must be a number, got {}",
                value
            ))),
            Some(value) => Ok(clamp_intensity(value)),
            None => self.stored_intensity(),
        }
    }

    /// Persisted intensity, falling back to the configured default
    pub fn stored_intensity(&self) -> Result<f64> {
        let default = self.config.default_intensity;
        let Some(raw) = self.store.get_setting(INTENSITY_SETTING)? else {
            return Ok(default);
        };

        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(clamp_intensity(value)),
            _ => {
                warn!(value = %raw, "Ignoring unparseable {} setting", INTENSITY_SETTING);
                Ok(default)
            }
        }
    }

    /// Clamp and persist the intensity dial, returning the stored value
    pub fn set_intensity(&self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(Error::Validation(format!(
                "intensity must be a number, got {}",
                value
            )));
        }
        let value = clamp_intensity(value);
        self.store.set_setting(INTENSITY_SETTING, &value.to_string())?;
        Ok(value)
    }

    fn target_for(&self, group: SpendingGroup) -> Result<f64> {
        if !group.is_adaptive() {
            return Ok(0.0);
        }
        Ok(self
            .store
            .get_target(group)?
            .unwrap_or_else(|| self.config.default_target(group)))
    }
}
