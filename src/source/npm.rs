//! NPM registry source
//!
//! Samples packages across several search terms, keeps those in the mature
//! age band, and pairs week-one downloads (the early series) with the
//! trailing-30-day download count (the outcome).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use super::EntitySource;
use crate::config::NpmConfig;
use crate::entity::{ActivitySeries, Entity};

/// Client for the NPM registry and downloads APIs
pub struct NpmClient {
    config: NpmConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: SearchPackage,
}

#[derive(Debug, Deserialize)]
struct SearchPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PackageInfo {
    #[serde(default)]
    time: PackageTimes,
}

#[derive(Debug, Default, Deserialize)]
struct PackageTimes {
    created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct DownloadPoint {
    #[serde(default)]
    downloads: u64,
}

impl NpmClient {
    pub fn new(config: NpmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/-/v1/search", self.config.registry_url);
        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("text", query.to_string()),
                ("size", self.config.search_size.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(response.objects.into_iter().map(|o| o.package.name).collect())
    }

    async fn created_at(&self, name: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
        let url = format!("{}/{name}", self.config.registry_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let info: PackageInfo = response.json().await?;
        Ok(info.time.created)
    }

    /// Downloads for an inclusive date range, or None when unavailable
    async fn downloads(
        &self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Option<u64>> {
        let url = format!(
            "{}/point/{}:{}/{name}",
            self.config.downloads_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let point: DownloadPoint = response.json().await?;
        Ok(Some(point.downloads))
    }

    fn in_age_band(&self, published: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age_years = (now - published).num_days() as f64 / 365.0;
        age_years >= self.config.min_age_years && age_years <= self.config.max_age_years
    }

    fn adapt(&self, name: &str, published: DateTime<Utc>, week1: u64, recent: u64) -> Entity {
        let series = ActivitySeries::from_pairs(vec![
            (published, 0),
            (published + ChronoDuration::days(7), week1),
        ]);
        Entity::new(name, series).with_outcome("recent_downloads", recent as f64)
    }
}

#[async_trait::async_trait]
impl EntitySource for NpmClient {
    fn domain(&self) -> &'static str {
        "npm"
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        for query in &self.config.queries {
            tracing::debug!(%query, "Searching packages");
            for name in self.search(query).await? {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            if names.len() >= limit * 2 {
                break;
            }
        }
        tracing::info!(candidates = names.len(), "Package search complete");

        let now = Utc::now();
        let mut entities = Vec::new();
        for name in names {
            if entities.len() >= limit {
                break;
            }

            let Some(published) = self.created_at(&name).await? else {
                continue;
            };
            if !self.in_age_band(published, now) {
                continue;
            }

            let week1 = self
                .downloads(&name, published, published + ChronoDuration::days(7))
                .await?;
            let recent = self.downloads(&name, now - ChronoDuration::days(30), now).await?;

            if let (Some(week1), Some(recent)) = (week1, recent) {
                if recent > self.config.min_recent_downloads {
                    entities.push(self.adapt(&name, published, week1, recent));
                }
            }

            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        tracing::info!(entities = entities.len(), "NPM collection complete");
        Ok(entities)
    }
}
