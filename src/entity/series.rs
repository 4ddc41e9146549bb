//! Early-activity series
//!
//! An ordered sequence of (timestamp, cumulative count) observations. The
//! series is stored as handed over by the data source and validated at
//! classification time: a decreasing cumulative count means a bad or
//! miscombined upstream record and is reported, never coerced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One observation: cumulative activity as of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub cumulative: u64,
}

/// A series that is internally inconsistent
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SeriesError {
    /// Cumulative count drops between consecutive points
    #[error("cumulative count decreases at index {index}")]
    DecreasingCount { index: usize },
    /// Timestamps go backwards between consecutive points
    #[error("timestamp decreases at index {index}")]
    DecreasingTimestamp { index: usize },
}

/// Ordered early-activity history for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySeries {
    points: Vec<SeriesPoint>,
}

impl ActivitySeries {
    /// Create a series from observation points, in source order
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    /// Convenience constructor from (timestamp, cumulative) pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (DateTime<Utc>, u64)>) -> Self {
        Self {
            points: pairs
                .into_iter()
                .map(|(timestamp, cumulative)| SeriesPoint {
                    timestamp,
                    cumulative,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Check that both timestamps and cumulative counts are non-decreasing
    pub fn validate(&self) -> Result<(), SeriesError> {
        for (index, pair) in self.points.windows(2).enumerate() {
            let index = index + 1;
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SeriesError::DecreasingTimestamp { index });
            }
            if pair[1].cumulative < pair[0].cumulative {
                return Err(SeriesError::DecreasingCount { index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_monotonic_series() {
        let series = ActivitySeries::from_pairs(vec![
            (base(), 1),
            (base() + Duration::hours(1), 1),
            (base() + Duration::hours(2), 5),
        ]);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_series() {
        let series = ActivitySeries::default();
        assert!(series.validate().is_ok());
        assert!(series.is_empty());
    }

    #[test]
    fn test_validate_decreasing_count() {
        let series = ActivitySeries::from_pairs(vec![
            (base(), 10),
            (base() + Duration::hours(1), 4),
        ]);
        assert_eq!(
            series.validate(),
            Err(SeriesError::DecreasingCount { index: 1 })
        );
    }

    #[test]
    fn test_validate_decreasing_timestamp() {
        let series = ActivitySeries::from_pairs(vec![
            (base() + Duration::hours(1), 1),
            (base(), 2),
        ]);
        assert_eq!(
            series.validate(),
            Err(SeriesError::DecreasingTimestamp { index: 1 })
        );
    }

    #[test]
    fn test_first_last() {
        let series = ActivitySeries::from_pairs(vec![
            (base(), 1),
            (base() + Duration::hours(3), 9),
        ]);
        assert_eq!(series.first().unwrap().cumulative, 1);
        assert_eq!(series.last().unwrap().cumulative, 9);
        assert_eq!(series.len(), 2);
    }
}
