//! Canonical entity model
//!
//! Every data source (GitHub repos, HN posts, NPM packages, papers) is
//! adapted into the same `Entity` shape before classification. The core
//! never branches on where an entity came from.

mod series;

pub use series::{ActivitySeries, SeriesError, SeriesPoint};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observed subject: a repository, a post, a package, a paper.
///
/// Entities are read-only once constructed; the classifier never mutates
/// them. An entity carries one early-activity series and one or more named
/// outcome horizons (e.g. both `score` and `comments` for an HN post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Opaque stable identifier (e.g. "owner/repo", an HN item id)
    pub id: String,

    /// Cumulative activity over the memory-accumulation window
    pub early_series: ActivitySeries,

    /// Outcome metrics measured at later horizons, keyed by horizon name
    pub outcomes: BTreeMap<String, f64>,
}

impl Entity {
    /// Create an entity with no outcomes recorded yet
    pub fn new(id: impl Into<String>, early_series: ActivitySeries) -> Self {
        Self {
            id: id.into(),
            early_series,
            outcomes: BTreeMap::new(),
        }
    }

    /// Record an outcome value under a named horizon
    pub fn with_outcome(mut self, horizon: impl Into<String>, value: f64) -> Self {
        self.outcomes.insert(horizon.into(), value);
        self
    }

    /// Look up the outcome for a horizon, if the entity carries it
    pub fn outcome(&self, horizon: &str) -> Option<f64> {
        self.outcomes.get(horizon).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series() -> ActivitySeries {
        ActivitySeries::from_pairs(vec![
            (Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 1),
            (Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), 10),
        ])
    }

    #[test]
    fn test_outcome_lookup() {
        let entity = Entity::new("a/b", series())
            .with_outcome("score", 42.0)
            .with_outcome("comments", 7.0);

        assert_eq!(entity.outcome("score"), Some(42.0));
        assert_eq!(entity.outcome("comments"), Some(7.0));
        assert_eq!(entity.outcome("downloads"), None);
    }

    #[test]
    fn test_entity_roundtrip_json() {
        let entity = Entity::new("pkg", series()).with_outcome("recent_downloads", 1000.0);
        let json = serde_json::to_string(&entity).unwrap();
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(entity, back);
    }
}
