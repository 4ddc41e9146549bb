//! Configuration types for momentum-lab
//!
//! Every analysis constant the original studies hard-coded per script
//! (threshold counts, day cutoffs, search queries, rate-limit delays) is a
//! configurable field with those values as defaults, so a single binary
//! covers all four domains.

use serde::Deserialize;
use std::path::PathBuf;

use crate::classifier::{SplitMode, TimeUnit, VelocityMethod};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Per-domain data source configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
    #[serde(default)]
    pub npm: NpmConfig,
    #[serde(default)]
    pub citations: CitationsConfig,
}

/// Entity snapshot cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one JSON snapshot per source
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Velocity definition, split mode and outcome horizon for one domain
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    pub velocity: VelocityMethod,
    pub split: SplitMode,
    pub outcome_horizon: String,
}

impl AnalysisConfig {
    /// Reject configurations that can only produce degenerate runs
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.velocity {
            VelocityMethod::TimeToThreshold { threshold, .. } if *threshold == 0 => {
                anyhow::bail!("velocity threshold must be positive")
            }
            VelocityMethod::RateInWindow { window, .. } if *window <= 0.0 => {
                anyhow::bail!("velocity window must be positive")
            }
            _ => {}
        }
        match &self.split {
            SplitMode::Percentile { percent } => {
                if *percent <= 0.0 || *percent > 50.0 {
                    anyhow::bail!("split percentile must be in (0, 50], got {percent}");
                }
            }
            SplitMode::FixedThreshold { fast_min, slow_max } => {
                if fast_min <= slow_max {
                    anyhow::bail!(
                        "fast_min ({fast_min}) must exceed slow_max ({slow_max})"
                    );
                }
            }
        }
        if self.outcome_horizon.is_empty() {
            anyhow::bail!("outcome horizon must not be empty");
        }
        Ok(())
    }
}

/// GitHub star-history source
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_github_token_env")]
    pub token_env: String,

    /// Repository search query (objective sampling, not hand-picked repos)
    #[serde(default = "default_github_query")]
    pub query: String,

    #[serde(default = "default_github_search_pages")]
    pub search_pages: u32,

    #[serde(default = "default_github_stargazer_pages")]
    pub stargazer_pages: u32,

    /// Name/description terms marking non-code repos to skip
    #[serde(default = "default_github_skip_terms")]
    pub skip_terms: Vec<String>,

    /// Delay between search requests (ms)
    #[serde(default = "default_github_search_delay_ms")]
    pub search_delay_ms: u64,

    /// Delay between stargazer page requests (ms)
    #[serde(default = "default_github_stargazer_delay_ms")]
    pub stargazer_delay_ms: u64,

    #[serde(default = "default_github_analysis")]
    pub analysis: AnalysisConfig,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_github_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_github_query() -> String {
    "created:2020-01-01..2023-12-31 stars:>1000".to_string()
}
fn default_github_search_pages() -> u32 {
    5
}
fn default_github_stargazer_pages() -> u32 {
    3
}
fn default_github_skip_terms() -> Vec<String> {
    ["awesome", "tutorial", "learn", "roadmap", "interview", "cheatsheet"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_github_search_delay_ms() -> u64 {
    2_000
}
fn default_github_stargazer_delay_ms() -> u64 {
    200
}
fn default_github_analysis() -> AnalysisConfig {
    let velocity = VelocityMethod::TimeToThreshold {
        threshold: 100,
        unit: TimeUnit::Days,
    };
    // "instant" = 100 stars in under 5 days, "gradual" = over 30 days
    let fast_min = velocity.velocity_at_elapsed(5.0).unwrap_or(20.0);
    let slow_max = velocity.velocity_at_elapsed(30.0).unwrap_or(10.0 / 3.0);
    AnalysisConfig {
        velocity,
        split: SplitMode::FixedThreshold { fast_min, slow_max },
        outcome_horizon: "acceleration".to_string(),
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token_env: default_github_token_env(),
            query: default_github_query(),
            search_pages: default_github_search_pages(),
            stargazer_pages: default_github_stargazer_pages(),
            skip_terms: default_github_skip_terms(),
            search_delay_ms: default_github_search_delay_ms(),
            stargazer_delay_ms: default_github_stargazer_delay_ms(),
            analysis: default_github_analysis(),
        }
    }
}

/// Hacker News front-page source
#[derive(Debug, Clone, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "default_hn_api_url")]
    pub api_url: String,

    /// Minimum score for a story to count as engaged
    #[serde(default = "default_hn_min_score")]
    pub min_score: i64,

    /// Posts younger than this have not stabilized and are skipped
    #[serde(default = "default_hn_min_age_hours")]
    pub min_age_hours: f64,

    /// Length of the early-engagement window (hours)
    #[serde(default = "default_hn_window_hours")]
    pub window_hours: f64,

    /// Weight of a comment relative to an upvote in the engagement proxy
    #[serde(default = "default_hn_comment_weight")]
    pub comment_weight: f64,

    /// Delay between item requests (ms)
    #[serde(default = "default_hn_item_delay_ms")]
    pub item_delay_ms: u64,

    #[serde(default = "default_hn_analysis")]
    pub analysis: AnalysisConfig,
}

fn default_hn_api_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}
fn default_hn_min_score() -> i64 {
    10
}
fn default_hn_min_age_hours() -> f64 {
    24.0
}
fn default_hn_window_hours() -> f64 {
    24.0
}
fn default_hn_comment_weight() -> f64 {
    2.0
}
fn default_hn_item_delay_ms() -> u64 {
    50
}
fn default_hn_analysis() -> AnalysisConfig {
    AnalysisConfig {
        velocity: VelocityMethod::RateInWindow {
            window: 24.0,
            unit: TimeUnit::Hours,
        },
        split: SplitMode::Percentile { percent: 20.0 },
        outcome_horizon: "score".to_string(),
    }
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            api_url: default_hn_api_url(),
            min_score: default_hn_min_score(),
            min_age_hours: default_hn_min_age_hours(),
            window_hours: default_hn_window_hours(),
            comment_weight: default_hn_comment_weight(),
            item_delay_ms: default_hn_item_delay_ms(),
            analysis: default_hn_analysis(),
        }
    }
}

/// NPM registry source
#[derive(Debug, Clone, Deserialize)]
pub struct NpmConfig {
    #[serde(default = "default_npm_registry_url")]
    pub registry_url: String,

    #[serde(default = "default_npm_downloads_url")]
    pub downloads_url: String,

    /// Search terms sampled to build the package population
    #[serde(default = "default_npm_queries")]
    pub queries: Vec<String>,

    #[serde(default = "default_npm_search_size")]
    pub search_size: u32,

    /// Age band that makes a package mature but not ancient (years)
    #[serde(default = "default_npm_min_age_years")]
    pub min_age_years: f64,
    #[serde(default = "default_npm_max_age_years")]
    pub max_age_years: f64,

    /// Packages below this trailing-30-day count are considered inactive
    #[serde(default = "default_npm_min_recent_downloads")]
    pub min_recent_downloads: u64,

    #[serde(default = "default_npm_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_npm_analysis")]
    pub analysis: AnalysisConfig,
}

fn default_npm_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}
fn default_npm_downloads_url() -> String {
    "https://api.npmjs.org/downloads".to_string()
}
fn default_npm_queries() -> Vec<String> {
    [
        "react component",
        "vue component",
        "typescript utility",
        "build tool",
        "testing library",
        "api client",
        "cli tool",
        "webpack plugin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_npm_search_size() -> u32 {
    50
}
fn default_npm_min_age_years() -> f64 {
    0.5
}
fn default_npm_max_age_years() -> f64 {
    5.0
}
fn default_npm_min_recent_downloads() -> u64 {
    100
}
fn default_npm_request_delay_ms() -> u64 {
    500
}
fn default_npm_analysis() -> AnalysisConfig {
    AnalysisConfig {
        velocity: VelocityMethod::RateInWindow {
            window: 7.0,
            unit: TimeUnit::Days,
        },
        split: SplitMode::Percentile { percent: 20.0 },
        outcome_horizon: "recent_downloads".to_string(),
    }
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            registry_url: default_npm_registry_url(),
            downloads_url: default_npm_downloads_url(),
            queries: default_npm_queries(),
            search_size: default_npm_search_size(),
            min_age_years: default_npm_min_age_years(),
            max_age_years: default_npm_max_age_years(),
            min_recent_downloads: default_npm_min_recent_downloads(),
            request_delay_ms: default_npm_request_delay_ms(),
            analysis: default_npm_analysis(),
        }
    }
}

/// Academic citations source (Semantic Scholar)
#[derive(Debug, Clone, Deserialize)]
pub struct CitationsConfig {
    #[serde(default = "default_citations_api_url")]
    pub api_url: String,

    /// Fields sampled for diversity
    #[serde(default = "default_citations_fields")]
    pub fields: Vec<String>,

    /// Publication years old enough to have matured
    #[serde(default = "default_citations_years")]
    pub years: Vec<i32>,

    #[serde(default = "default_citations_page_size")]
    pub page_size: u32,

    /// Papers below this total are too obscure to compare
    #[serde(default = "default_citations_min_total")]
    pub min_total_citations: u64,

    /// Delay between requests (ms); the API rate-limits aggressively
    #[serde(default = "default_citations_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_citations_analysis")]
    pub analysis: AnalysisConfig,
}

fn default_citations_api_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}
fn default_citations_fields() -> Vec<String> {
    [
        "machine learning",
        "deep learning",
        "computer vision",
        "natural language processing",
        "reinforcement learning",
        "neural networks",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_citations_years() -> Vec<i32> {
    vec![2018, 2019, 2020]
}
fn default_citations_page_size() -> u32 {
    50
}
fn default_citations_min_total() -> u64 {
    5
}
fn default_citations_request_delay_ms() -> u64 {
    10_000
}
fn default_citations_analysis() -> AnalysisConfig {
    AnalysisConfig {
        velocity: VelocityMethod::RateInWindow {
            window: 365.0,
            unit: TimeUnit::Days,
        },
        split: SplitMode::Percentile { percent: 20.0 },
        outcome_horizon: "total_citations".to_string(),
    }
}

impl Default for CitationsConfig {
    fn default() -> Self {
        Self {
            api_url: default_citations_api_url(),
            fields: default_citations_fields(),
            years: default_citations_years(),
            page_size: default_citations_page_size(),
            min_total_citations: default_citations_min_total(),
            request_delay_ms: default_citations_request_delay_ms(),
            analysis: default_citations_analysis(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.sources.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.sources.npm.queries.len(), 8);
        assert_eq!(
            config.sources.hackernews.analysis.outcome_horizon,
            "score"
        );
    }

    #[test]
    fn test_config_deserialize_overrides() {
        let toml = r#"
            [telemetry]
            log_level = "debug"

            [cache]
            dir = "/tmp/snapshots"

            [sources.github]
            query = "created:2022-01-01..2022-12-31 stars:>500"

            [sources.github.analysis]
            outcome_horizon = "stars_sampled"

            [sources.github.analysis.velocity]
            method = "time_to_threshold"
            threshold = 50
            unit = "days"

            [sources.github.analysis.split]
            mode = "percentile"
            percent = 25.0
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/snapshots"));
        assert!(config.sources.github.query.contains("2022"));
        assert_eq!(
            config.sources.github.analysis.velocity,
            VelocityMethod::TimeToThreshold {
                threshold: 50,
                unit: TimeUnit::Days,
            }
        );
        assert_eq!(
            config.sources.github.analysis.split,
            SplitMode::Percentile { percent: 25.0 }
        );
        // Untouched sources keep their defaults
        assert_eq!(config.sources.citations.years, vec![2018, 2019, 2020]);
    }

    #[test]
    fn test_github_default_cutoffs_match_day_bands() {
        let analysis = default_github_analysis();
        match analysis.split {
            SplitMode::FixedThreshold { fast_min, slow_max } => {
                assert_eq!(fast_min, 20.0); // 100 stars / 5 days
                assert!((slow_max - 100.0 / 30.0).abs() < 1e-9);
            }
            _ => panic!("expected fixed-threshold default"),
        }
    }

    #[test]
    fn test_analysis_validate_rejects_bad_percentile() {
        let mut analysis = default_npm_analysis();
        analysis.split = SplitMode::Percentile { percent: 75.0 };
        assert!(analysis.validate().is_err());

        analysis.split = SplitMode::Percentile { percent: 0.0 };
        assert!(analysis.validate().is_err());

        analysis.split = SplitMode::Percentile { percent: 20.0 };
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn test_analysis_validate_rejects_overlapping_cutoffs() {
        let mut analysis = default_github_analysis();
        analysis.split = SplitMode::FixedThreshold {
            fast_min: 1.0,
            slow_max: 5.0,
        };
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn test_analysis_validate_rejects_zero_window() {
        let mut analysis = default_npm_analysis();
        analysis.velocity = VelocityMethod::RateInWindow {
            window: 0.0,
            unit: TimeUnit::Days,
        };
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
