//! Cohort splitting
//!
//! Ranks eligible entities by early velocity and partitions the population
//! into {high, low, middle, excluded, malformed}. Two modes:
//!
//! - Percentile: top P% and bottom P% of the eligible population. Cohort
//!   sizes are guaranteed non-trivial whenever the population is large
//!   enough, at the cost of the boundary shifting with the sample.
//! - Fixed threshold: "fast" and "slow" velocity predicates with a dead
//!   zone between them. Cohort sizes are sample-dependent and the split
//!   fails outright on adversarial inputs instead of producing a
//!   degenerate statistic.
//!
//! Entities tied with a percentile boundary value are absorbed into the
//! boundary's cohort, so repeated runs over the same input are
//! bit-identical and never drop tied entities arbitrarily.

use serde::{Deserialize, Serialize};

use super::types::{
    Eligibility, ExcludedEntity, ExclusionReason, MalformedEntity, ScoredEntity, SplitError,
};
use super::velocity::{compute_velocity, VelocityMethod};
use crate::entity::Entity;

/// How the eligible population is partitioned into cohorts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitMode {
    /// Top / bottom `percent` of the eligible population by velocity
    Percentile { percent: f64 },
    /// Velocity >= `fast_min` is fast, <= `slow_max` is slow,
    /// anything between is reported as the middle band
    FixedThreshold { fast_min: f64, slow_max: f64 },
}

/// Result of a split: every input entity lands in exactly one bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohortSplit {
    /// High-early-velocity cohort, sorted fastest first
    pub high: Vec<ScoredEntity>,
    /// Low-early-velocity cohort, sorted fastest first
    pub low: Vec<ScoredEntity>,
    /// Eligible entities in neither cohort (dead zone / between percentiles)
    pub middle: Vec<ScoredEntity>,
    /// Entities with no velocity or no outcome under this configuration
    pub excluded: Vec<ExcludedEntity>,
    /// Entities with internally inconsistent series, surfaced per-entity
    pub malformed: Vec<MalformedEntity>,
}

/// Score, rank and partition a set of entities.
///
/// Pure function of (entities, method, horizon, mode); holds no state and
/// may run concurrently with other splits over the same entity slice.
pub fn rank_and_split(
    entities: &[Entity],
    method: &VelocityMethod,
    outcome_horizon: &str,
    mode: &SplitMode,
) -> Result<CohortSplit, SplitError> {
    let mut eligible: Vec<ScoredEntity> = Vec::with_capacity(entities.len());
    let mut excluded = Vec::new();
    let mut malformed = Vec::new();

    for entity in entities {
        match compute_velocity(&entity.early_series, method) {
            Err(error) => malformed.push(MalformedEntity {
                id: entity.id.clone(),
                error,
            }),
            Ok(Eligibility::Ineligible(reason)) => excluded.push(ExcludedEntity {
                id: entity.id.clone(),
                reason: ExclusionReason::Ineligible(reason),
            }),
            Ok(Eligibility::Eligible(velocity)) => match entity.outcome(outcome_horizon) {
                Some(outcome) => eligible.push(ScoredEntity {
                    id: entity.id.clone(),
                    velocity,
                    outcome,
                }),
                None => excluded.push(ExcludedEntity {
                    id: entity.id.clone(),
                    reason: ExclusionReason::MissingOutcome {
                        horizon: outcome_horizon.to_string(),
                    },
                }),
            },
        }
    }

    // Descending velocity, id as a deterministic tie-break
    eligible.sort_by(|a, b| {
        b.velocity
            .total_cmp(&a.velocity)
            .then_with(|| a.id.cmp(&b.id))
    });

    let total = entities.len();
    let n = eligible.len();

    let (high, middle, low) = match *mode {
        SplitMode::Percentile { percent } => {
            let count = (n as f64 * percent / 100.0).floor() as usize;
            if count == 0 {
                return Err(SplitError::InsufficientCohortSize {
                    total,
                    eligible: n,
                    n_high: 0,
                    n_low: 0,
                });
            }

            // Absorb boundary ties into the boundary's cohort
            let high_boundary = eligible[count - 1].velocity;
            let mut high_end = count;
            while high_end < n && eligible[high_end].velocity == high_boundary {
                high_end += 1;
            }

            let low_boundary = eligible[n - count].velocity;
            let mut low_start = n - count;
            while low_start > 0 && eligible[low_start - 1].velocity == low_boundary {
                low_start -= 1;
            }

            if high_end > low_start {
                // A tie band spans both cohorts; no disjoint split exists
                return Err(SplitError::InsufficientCohortSize {
                    total,
                    eligible: n,
                    n_high: high_end,
                    n_low: n - low_start,
                });
            }

            let low = eligible.split_off(low_start);
            let middle = eligible.split_off(high_end);
            (eligible, middle, low)
        }
        SplitMode::FixedThreshold { fast_min, slow_max } => {
            if fast_min <= slow_max {
                return Err(SplitError::OverlappingCutoffs { fast_min, slow_max });
            }

            let mut high = Vec::new();
            let mut middle = Vec::new();
            let mut low = Vec::new();
            for entity in eligible {
                if entity.velocity >= fast_min {
                    high.push(entity);
                } else if entity.velocity <= slow_max {
                    low.push(entity);
                } else {
                    middle.push(entity);
                }
            }
            (high, middle, low)
        }
    };

    if high.is_empty() || low.is_empty() {
        return Err(SplitError::InsufficientCohortSize {
            total,
            eligible: n,
            n_high: high.len(),
            n_low: low.len(),
        });
    }

    Ok(CohortSplit {
        high,
        low,
        middle,
        excluded,
        malformed,
    })
}
