//! Target adaptation from user feedback

use chrono::NaiveDate;

use super::window::round2;
use crate::error::{Error, Result};
use crate::models::{FeedbackRecord, Sentiment, SpendingGroup};

/// Outcome of one feedback event, before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAdjustment {
    /// New target when the sentiment moves it
    pub new_target: Option<f64>,
    pub record: FeedbackRecord,
}

/// Apply a feedback sentiment to a group's target.
///
/// "good" pulls the target toward the observed rate:
/// `round2((1 - smoothing) * old + smoothing * rate)`. "bad" leaves it alone.
/// A feedback record is produced either way.
pub fn adjust_target(
    group: SpendingGroup,
    old_target: f64,
    current_rate: f64,
    sentiment: Sentiment,
    smoothing: f64,
    today: NaiveDate,
) -> Result<TargetAdjustment> {
    if !group.is_adaptive() {
        return Err(Error::Validation(format!(
            "group '{}' does not accept feedback",
            group
        )));
    }

    let new_target = match sentiment {
        Sentiment::Good => Some(round2(
            (1.0 - smoothing) * old_target + smoothing * current_rate,
        )),
        Sentiment::Bad => None,
    };

    Ok(TargetAdjustment {
        new_target,
        record: FeedbackRecord {
            group,
            date: today,
            sentiment,
            rate_at_feedback: current_rate,
        },
    })
}
