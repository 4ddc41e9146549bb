//! Hacker News source
//!
//! The Firebase API exposes only a current snapshot per item, so the early
//! series is the original study's proxy: observed engagement (score plus
//! weighted comments) prorated over the configured early window. Posts
//! younger than the stabilization age are omitted rather than handed over
//! half-measured.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::EntitySource;
use crate::config::HackerNewsConfig;
use crate::entity::{ActivitySeries, Entity};

/// Client for the Hacker News Firebase API
pub struct HackerNewsClient {
    config: HackerNewsConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    descendants: i64,
    #[serde(default)]
    time: i64,
}

impl HackerNewsClient {
    pub fn new(config: HackerNewsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn story_ids(&self, list: &str) -> anyhow::Result<Vec<u64>> {
        let url = format!("{}/{list}.json", self.config.api_url);
        tracing::debug!(%url, "Fetching story id list");
        let ids: Vec<u64> = self.client.get(&url).send().await?.json().await?;
        Ok(ids)
    }

    async fn item(&self, id: u64) -> anyhow::Result<Option<HnItem>> {
        let url = format!("{}/item/{id}.json", self.config.api_url);
        let item: Option<HnItem> = self.client.get(&url).send().await?.json().await?;
        Ok(item)
    }

    /// Adapt one story snapshot into an entity, or skip it
    fn adapt(&self, item: &HnItem, observed_at: DateTime<Utc>) -> Option<Entity> {
        if item.kind.as_deref() != Some("story") || item.score < self.config.min_score {
            return None;
        }

        let posted = Utc.timestamp_opt(item.time, 0).single()?;
        let age_hours = (observed_at - posted).num_seconds() as f64 / 3_600.0;
        if age_hours < self.config.min_age_hours {
            // Not stabilized yet; omit instead of guessing
            return None;
        }

        // Engagement prorated to the early window: preserves the ranking of
        // the score-per-hour proxy while fitting the cumulative-series shape
        let engagement = item.score as f64 + self.config.comment_weight * item.descendants as f64;
        let window_engagement = (engagement * self.config.window_hours / age_hours).round() as u64;

        let window_end =
            posted + ChronoDuration::seconds((self.config.window_hours * 3_600.0) as i64);
        let series = ActivitySeries::from_pairs(vec![(posted, 0), (window_end, window_engagement)]);

        Some(
            Entity::new(item.id.to_string(), series)
                .with_outcome("score", item.score as f64)
                .with_outcome("comments", item.descendants as f64),
        )
    }
}

#[async_trait::async_trait]
impl EntitySource for HackerNewsClient {
    fn domain(&self) -> &'static str {
        "hackernews"
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        let mut ids = self.story_ids("topstories").await?;
        ids.extend(self.story_ids("beststories").await?);
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(*id));
        tracing::info!(candidates = ids.len(), "Fetched story id lists");

        let observed_at = Utc::now();
        let mut entities = Vec::new();
        for id in ids {
            if entities.len() >= limit {
                break;
            }
            if let Some(item) = self.item(id).await? {
                if let Some(entity) = self.adapt(&item, observed_at) {
                    entities.push(entity);
                }
            }
            tokio::time::sleep(Duration::from_millis(self.config.item_delay_ms)).await;
        }

        tracing::info!(entities = entities.len(), "Hacker News collection complete");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HackerNewsClient {
        HackerNewsClient::new(HackerNewsConfig::default())
    }

    fn story(score: i64, descendants: i64, age_hours: i64, observed: DateTime<Utc>) -> HnItem {
        HnItem {
            id: 12345,
            kind: Some("story".to_string()),
            score,
            descendants,
            time: (observed - ChronoDuration::hours(age_hours)).timestamp(),
        }
    }

    fn observed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_adapt_builds_prorated_series() {
        let client = client();
        // 48h old, score 100, 25 comments => engagement 150, half in window
        let entity = client.adapt(&story(100, 25, 48, observed()), observed()).unwrap();

        assert_eq!(entity.id, "12345");
        assert_eq!(entity.early_series.len(), 2);
        assert_eq!(entity.early_series.last().unwrap().cumulative, 75);
        assert_eq!(entity.outcome("score"), Some(100.0));
        assert_eq!(entity.outcome("comments"), Some(25.0));
        assert!(entity.early_series.validate().is_ok());
    }

    #[test]
    fn test_adapt_skips_young_posts() {
        let client = client();
        assert!(client.adapt(&story(100, 5, 6, observed()), observed()).is_none());
    }

    #[test]
    fn test_adapt_skips_low_score() {
        let client = client();
        assert!(client.adapt(&story(3, 0, 48, observed()), observed()).is_none());
    }

    #[test]
    fn test_adapt_skips_non_stories() {
        let client = client();
        let mut item = story(50, 5, 48, observed());
        item.kind = Some("job".to_string());
        assert!(client.adapt(&item, observed()).is_none());
    }
}
