//! Classifier types
//!
//! Scoring outcomes, bucket membership records, and split errors.

use crate::entity::SeriesError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of scoring one entity's early velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eligibility {
    /// A comparable velocity: larger always means faster
    Eligible(f64),
    /// Not enough history under the configured method; never coerced to 0
    Ineligible(IneligibleReason),
}

/// Why an entity could not be assigned a velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibleReason {
    /// The early series has no observations
    EmptySeries,
    /// Cumulative count never reaches the configured threshold
    ThresholdNotReached { threshold: u64 },
    /// The series ends before the configured window does
    WindowNotCovered { window: f64 },
}

/// An entity that was scored and carries the configured outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub id: String,
    pub velocity: f64,
    pub outcome: f64,
}

/// Why an entity was excluded from ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No velocity under the configured method
    Ineligible(IneligibleReason),
    /// The entity does not carry the configured outcome horizon
    MissingOutcome { horizon: String },
}

/// An excluded entity and the reason it was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedEntity {
    pub id: String,
    pub reason: ExclusionReason,
}

/// An entity whose early series is internally inconsistent
///
/// Malformed entities are a data-quality defect in the upstream source.
/// They are surfaced per-entity so one bad record cannot abort a run,
/// but they are never silently dropped or coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalformedEntity {
    pub id: String,
    pub error: SeriesError,
}

/// Run-level failure: the requested comparison cannot be made
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// A cohort came out empty, or boundary ties span both cohorts.
    /// Carries population counts so the caller can report "N entities,
    /// M eligible, split failed" rather than an opaque error.
    #[error(
        "insufficient cohort size: {total} entities, {eligible} eligible, \
         high={n_high}, low={n_low}"
    )]
    InsufficientCohortSize {
        total: usize,
        eligible: usize,
        n_high: usize,
        n_low: usize,
    },

    /// Fixed-threshold cutoffs admit the same velocity into both cohorts
    #[error("cutoffs overlap: fast_min {fast_min} must exceed slow_max {slow_max}")]
    OverlappingCutoffs { fast_min: f64, slow_max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ineligible_reason_serializes_with_tag() {
        let reason = IneligibleReason::ThresholdNotReached { threshold: 100 };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["reason"], "threshold_not_reached");
        assert_eq!(json["threshold"], 100);
    }

    #[test]
    fn test_split_error_message_carries_counts() {
        let err = SplitError::InsufficientCohortSize {
            total: 10,
            eligible: 1,
            n_high: 0,
            n_low: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 entities"));
        assert!(msg.contains("1 eligible"));
    }
}
