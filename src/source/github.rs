//! GitHub star-history source
//!
//! Samples repositories objectively via the search API and pulls per-star
//! timestamps with the `star+json` media type. The early series is the
//! cumulative star count at each star's timestamp; the outcome is the
//! original study's acceleration metric (days for the first hundred stars
//! over days for the second hundred).

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::EntitySource;
use crate::config::GithubConfig;
use crate::entity::{ActivitySeries, Entity};

/// Stars needed to compute the acceleration outcome (two bands of 100)
const MIN_STARS_FOR_ACCELERATION: usize = 200;

/// Client for the GitHub REST API
pub struct GitHubClient {
    config: GithubConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchRepo>,
}

#[derive(Debug, Deserialize)]
struct SearchRepo {
    name: String,
    description: Option<String>,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Stargazer {
    starred_at: Option<DateTime<Utc>>,
}

impl GitHubClient {
    /// Create a client, reading the API token from the configured
    /// environment variable
    pub fn new(config: GithubConfig) -> anyhow::Result<Self> {
        let token = std::env::var(&config.token_env).map_err(|_| {
            anyhow::anyhow!(
                "environment variable {} not set; a GitHub token is required",
                config.token_env
            )
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::try_from(format!("token {token}"))?);
        // starred_at is only present with this media type
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3.star+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("momentum-lab"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self { config, client })
    }

    /// Search repositories matching the configured query, page by page
    async fn search_repos(&self) -> anyhow::Result<Vec<SearchRepo>> {
        let url = format!("{}/search/repositories", self.config.api_url);
        let mut repos = Vec::new();

        for page in 1..=self.config.search_pages {
            tracing::debug!(page, query = %self.config.query, "Searching repositories");

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("q", self.config.query.clone()),
                    ("sort", "stars".to_string()),
                    ("order", "desc".to_string()),
                    ("per_page", "100".to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            if response.status() == StatusCode::FORBIDDEN {
                self.wait_for_rate_limit(&response).await;
                continue;
            }
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("GitHub search error: {status} - {body}");
            }

            let body: SearchResponse = response.json().await?;
            tracing::debug!(page, repos = body.items.len(), "Search page fetched");
            repos.extend(body.items);

            tokio::time::sleep(Duration::from_millis(self.config.search_delay_ms)).await;
        }

        Ok(repos)
    }

    async fn wait_for_rate_limit(&self, response: &reqwest::Response) {
        let reset = response
            .headers()
            .get("X-RateLimit-Reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let wait_secs = reset
            .map(|t| (t - Utc::now().timestamp()).max(0) as u64 + 10)
            .unwrap_or(60);
        tracing::warn!(wait_secs, "GitHub rate limited, backing off");
        tokio::time::sleep(Duration::from_secs(wait_secs)).await;
    }

    /// Fetch star timestamps for one repository, oldest first
    async fn star_timestamps(&self, owner: &str, name: &str) -> anyhow::Result<Vec<DateTime<Utc>>> {
        let url = format!("{}/repos/{owner}/{name}/stargazers", self.config.api_url);
        let mut stars = Vec::new();

        for page in 1..=self.config.stargazer_pages {
            let response = self
                .client
                .get(&url)
                .query(&[("per_page", "100".to_string()), ("page", page.to_string())])
                .send()
                .await?;

            if !response.status().is_success() {
                break;
            }

            let batch: Vec<Stargazer> = response.json().await?;
            if batch.is_empty() {
                break;
            }
            stars.extend(batch.into_iter().filter_map(|s| s.starred_at));

            tokio::time::sleep(Duration::from_millis(self.config.stargazer_delay_ms)).await;
        }

        stars.sort();
        Ok(stars)
    }

    /// Skip obvious non-code repos (awesome lists, tutorials, roadmaps)
    fn is_code_repo(&self, repo: &SearchRepo) -> bool {
        let name = repo.name.to_lowercase();
        let description = repo
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        !self
            .config
            .skip_terms
            .iter()
            .any(|term| name.contains(term) || description.contains(term))
    }

    /// Build an entity from one repo's star history, if it has enough
    fn adapt(&self, id: String, stars: &[DateTime<Utc>]) -> Option<Entity> {
        if stars.len() < MIN_STARS_FOR_ACCELERATION {
            tracing::debug!(repo = %id, stars = stars.len(), "Insufficient star history, skipping");
            return None;
        }

        let first_100_days = (stars[99] - stars[0]).num_days().max(0) as f64;
        let second_100_days = (stars[199] - stars[100]).num_days().max(1) as f64;
        let acceleration = first_100_days / second_100_days;

        let series = ActivitySeries::from_pairs(
            stars
                .iter()
                .enumerate()
                .map(|(i, ts)| (*ts, (i + 1) as u64)),
        );

        Some(
            Entity::new(id, series)
                .with_outcome("acceleration", acceleration)
                .with_outcome("stars_sampled", stars.len() as f64),
        )
    }
}

#[async_trait::async_trait]
impl EntitySource for GitHubClient {
    fn domain(&self) -> &'static str {
        "github"
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        let repos = self.search_repos().await?;
        let candidates: Vec<&SearchRepo> =
            repos.iter().filter(|r| self.is_code_repo(r)).collect();
        tracing::info!(
            found = repos.len(),
            code_repos = candidates.len(),
            "Repository search complete"
        );

        let mut entities = Vec::new();
        for repo in candidates {
            if entities.len() >= limit {
                break;
            }

            let id = format!("{}/{}", repo.owner.login, repo.name);
            let stars = self.star_timestamps(&repo.owner.login, &repo.name).await?;
            if let Some(entity) = self.adapt(id, &stars) {
                entities.push(entity);
            }
        }

        tracing::info!(entities = entities.len(), "GitHub collection complete");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn client() -> GitHubClient {
        std::env::set_var("GITHUB_TOKEN_TEST", "test-token");
        let config = GithubConfig {
            token_env: "GITHUB_TOKEN_TEST".to_string(),
            ..GithubConfig::default()
        };
        GitHubClient::new(config).unwrap()
    }

    fn star_run(count: usize, spacing_hours: i64) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| base + ChronoDuration::hours(i as i64 * spacing_hours))
            .collect()
    }

    #[test]
    fn test_adapt_computes_acceleration() {
        let client = client();
        // First 100 stars over ~50 days (12h spacing), then same cadence
        let stars = star_run(250, 12);
        let entity = client.adapt("o/r".to_string(), &stars).unwrap();

        assert_eq!(entity.id, "o/r");
        assert_eq!(entity.early_series.len(), 250);
        // Uniform cadence: both bands take the same time, acceleration ~1
        let acceleration = entity.outcome("acceleration").unwrap();
        assert!((acceleration - 1.0).abs() < 0.05, "got {acceleration}");
        assert_eq!(entity.outcome("stars_sampled"), Some(250.0));
        assert!(entity.early_series.validate().is_ok());
    }

    #[test]
    fn test_adapt_skips_short_histories() {
        let client = client();
        let stars = star_run(150, 12);
        assert!(client.adapt("o/r".to_string(), &stars).is_none());
    }

    #[test]
    fn test_skip_terms_filter_non_code_repos() {
        let client = client();
        let awesome = SearchRepo {
            name: "awesome-rust".to_string(),
            description: None,
            owner: RepoOwner {
                login: "x".to_string(),
            },
        };
        let real = SearchRepo {
            name: "ripgrep".to_string(),
            description: Some("a line-oriented search tool".to_string()),
            owner: RepoOwner {
                login: "x".to_string(),
            },
        };
        assert!(!client.is_code_repo(&awesome));
        assert!(client.is_code_repo(&real));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let config = GithubConfig {
            token_env: "MOMENTUM_LAB_NO_SUCH_VAR".to_string(),
            ..GithubConfig::default()
        };
        assert!(GitHubClient::new(config).is_err());
    }
}
