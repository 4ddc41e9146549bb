//! Academic citations source (Semantic Scholar graph API)
//!
//! Samples papers across fields and mature publication years. Year-one
//! citations (publication year plus the following year, as in the original
//! study) form the early series; total citations to date are the outcome.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::EntitySource;
use crate::config::CitationsConfig;
use crate::entity::{ActivitySeries, Entity};

/// Client for the Semantic Scholar graph API
pub struct CitationsClient {
    config: CitationsConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<PaperStub>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperStub {
    paper_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperDetails {
    paper_id: String,
    year: Option<i32>,
    #[serde(default)]
    citation_count: u64,
    publication_date: Option<NaiveDate>,
    #[serde(default)]
    citations: Vec<CitingPaper>,
}

#[derive(Debug, Deserialize)]
struct CitingPaper {
    year: Option<i32>,
}

impl CitationsClient {
    pub fn new(config: CitationsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn search(&self, field: &str, year: i32) -> anyhow::Result<Vec<PaperStub>> {
        let url = format!("{}/paper/search", self.config.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", field.to_string()),
                ("year", format!("{year}-{year}")),
                (
                    "fields",
                    "paperId,title,year,citationCount,publicationDate".to_string(),
                ),
                ("limit", self.config.page_size.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, field, year, "Paper search failed, skipping page");
            return Ok(Vec::new());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.data)
    }

    async fn details(&self, paper_id: &str) -> anyhow::Result<Option<PaperDetails>> {
        let url = format!("{}/paper/{paper_id}", self.config.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[(
                "fields",
                "paperId,year,citationCount,citations.year,publicationDate",
            )])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Adapt one paper's citation timeline into an entity, or skip it
    fn adapt(&self, paper: &PaperDetails) -> Option<Entity> {
        if paper.citation_count < self.config.min_total_citations {
            return None;
        }
        let pub_year = paper.year?;

        // Publication year plus the following year, as the year-1 proxy
        let year1: u64 = paper
            .citations
            .iter()
            .filter(|c| c.year == Some(pub_year) || c.year == Some(pub_year + 1))
            .count() as u64;

        let published = paper
            .publication_date
            .and_then(|d| Utc.from_local_datetime(&d.and_hms_opt(0, 0, 0)?).single())
            .unwrap_or(Utc.with_ymd_and_hms(pub_year, 1, 1, 0, 0, 0).single()?);

        let series = ActivitySeries::from_pairs(vec![
            (published, 0),
            (published + ChronoDuration::days(365), year1),
        ]);

        Some(
            Entity::new(paper.paper_id.clone(), series)
                .with_outcome("total_citations", paper.citation_count as f64)
                .with_outcome("year1_citations", year1 as f64),
        )
    }
}

#[async_trait::async_trait]
impl EntitySource for CitationsClient {
    fn domain(&self) -> &'static str {
        "citations"
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        let mut stubs = Vec::new();
        'outer: for field in &self.config.fields {
            for year in &self.config.years {
                tracing::debug!(field, year, "Searching papers");
                stubs.extend(self.search(field, *year).await?);
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
                if stubs.len() >= limit * 2 {
                    break 'outer;
                }
            }
        }
        tracing::info!(candidates = stubs.len(), "Paper search complete");

        let mut entities = Vec::new();
        for stub in stubs {
            if entities.len() >= limit {
                break;
            }
            if let Some(details) = self.details(&stub.paper_id).await? {
                if let Some(entity) = self.adapt(&details) {
                    entities.push(entity);
                }
            }
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        tracing::info!(entities = entities.len(), "Citations collection complete");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CitationsClient {
        CitationsClient::new(CitationsConfig::default())
    }

    fn paper(total: u64, years: &[i32]) -> PaperDetails {
        PaperDetails {
            paper_id: "abc123".to_string(),
            year: Some(2019),
            citation_count: total,
            publication_date: NaiveDate::from_ymd_opt(2019, 3, 15),
            citations: years.iter().map(|&y| CitingPaper { year: Some(y) }).collect(),
        }
    }

    #[test]
    fn test_adapt_counts_year1_citations() {
        let client = client();
        let entity = client
            .adapt(&paper(120, &[2019, 2019, 2020, 2021, 2023]))
            .unwrap();

        // 2019 + 2020 citations count as year 1
        assert_eq!(entity.early_series.last().unwrap().cumulative, 3);
        assert_eq!(entity.outcome("total_citations"), Some(120.0));
        assert_eq!(entity.outcome("year1_citations"), Some(3.0));
        assert!(entity.early_series.validate().is_ok());
    }

    #[test]
    fn test_adapt_skips_obscure_papers() {
        let client = client();
        assert!(client.adapt(&paper(3, &[2019])).is_none());
    }

    #[test]
    fn test_adapt_falls_back_to_january_first() {
        let client = client();
        let mut details = paper(50, &[2020]);
        details.publication_date = None;
        let entity = client.adapt(&details).unwrap();
        assert_eq!(
            entity.early_series.first().unwrap().timestamp,
            Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
