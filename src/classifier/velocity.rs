//! Early-velocity scoring
//!
//! Two interchangeable velocity definitions are used across domains:
//!
//! - `time_to_threshold`: elapsed time from the first observation to the
//!   first observation at or above a fixed count K. Shorter is faster, so
//!   the score is inverted to K / elapsed before ranking; "larger = faster"
//!   then holds uniformly and the cohorts can never be silently swapped by
//!   a sign-flip. An entity whose very first observation reaches K scores
//!   positive infinity, which ranks first and stays deterministic.
//! - `rate_in_window`: cumulative count at the end of a fixed early window
//!   divided by the window length. Used where an absolute threshold is not
//!   meaningful (download counts, post scores).

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::types::{Eligibility, IneligibleReason};
use crate::entity::{ActivitySeries, SeriesError};

/// Unit in which elapsed time and windows are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Hours,
}

impl TimeUnit {
    /// Express a duration as a fractional count of this unit
    pub fn span(&self, duration: Duration) -> f64 {
        let seconds = duration.num_milliseconds() as f64 / 1000.0;
        match self {
            TimeUnit::Days => seconds / 86_400.0,
            TimeUnit::Hours => seconds / 3_600.0,
        }
    }
}

/// How early velocity is derived from an entity's series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum VelocityMethod {
    /// K / (time from first observation to reaching K)
    TimeToThreshold { threshold: u64, unit: TimeUnit },
    /// (cumulative count at end of window) / window
    RateInWindow { window: f64, unit: TimeUnit },
}

impl VelocityMethod {
    /// Velocity corresponding to reaching the threshold in `elapsed` units.
    ///
    /// Lets fixed-threshold splits be configured in natural time cutoffs
    /// ("fast = under 5 days to 100 stars") and converted into velocity
    /// units. Only meaningful for the time-to-threshold form.
    pub fn velocity_at_elapsed(&self, elapsed: f64) -> Option<f64> {
        match self {
            VelocityMethod::TimeToThreshold { threshold, .. } if elapsed > 0.0 => {
                Some(*threshold as f64 / elapsed)
            }
            _ => None,
        }
    }
}

/// Score one entity's early velocity.
///
/// Returns `Ineligible` when the series cannot support the configured
/// method (empty, threshold never reached, window not covered) and an
/// error when the series is internally inconsistent.
pub fn compute_velocity(
    series: &ActivitySeries,
    method: &VelocityMethod,
) -> Result<Eligibility, SeriesError> {
    series.validate()?;

    let Some(first) = series.first() else {
        return Ok(Eligibility::Ineligible(IneligibleReason::EmptySeries));
    };

    match method {
        VelocityMethod::TimeToThreshold { threshold, unit } => {
            match series.points().iter().find(|p| p.cumulative >= *threshold) {
                Some(hit) => {
                    let elapsed = unit.span(hit.timestamp - first.timestamp);
                    let velocity = if elapsed == 0.0 {
                        f64::INFINITY
                    } else {
                        *threshold as f64 / elapsed
                    };
                    Ok(Eligibility::Eligible(velocity))
                }
                None => Ok(Eligibility::Ineligible(
                    IneligibleReason::ThresholdNotReached {
                        threshold: *threshold,
                    },
                )),
            }
        }
        VelocityMethod::RateInWindow { window, unit } => {
            let last = series.last().unwrap_or(first);
            let covered = unit.span(last.timestamp - first.timestamp);
            if covered < *window {
                return Ok(Eligibility::Ineligible(IneligibleReason::WindowNotCovered {
                    window: *window,
                }));
            }

            let end_count = series
                .points()
                .iter()
                .take_while(|p| unit.span(p.timestamp - first.timestamp) <= *window)
                .last()
                .map(|p| p.cumulative)
                .unwrap_or(0);

            Ok(Eligibility::Eligible(end_count as f64 / *window))
        }
    }
}
