//! Data-source collaborators
//!
//! Each source retrieves raw records from a public API and adapts them into
//! the canonical `Entity` shape. A source hands over complete, validated
//! entities or omits them; the classifier never sees HTTP, pagination or
//! rate limits.

mod cache;
mod citations;
mod github;
mod hackernews;
mod npm;

pub use cache::CachedSource;
pub use citations::CitationsClient;
pub use github::GitHubClient;
pub use hackernews::HackerNewsClient;
pub use npm::NpmClient;

use crate::config::Config;
use crate::entity::Entity;
use async_trait::async_trait;
use clap::ValueEnum;

/// Trait for entity source implementations
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Short label for logs and cache file names
    fn domain(&self) -> &'static str;

    /// Collect up to `limit` entities
    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>>;
}

#[async_trait]
impl EntitySource for Box<dyn EntitySource> {
    fn domain(&self) -> &'static str {
        self.as_ref().domain()
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        self.as_ref().collect(limit).await
    }
}

/// The data domains a fetch or analysis can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Github,
    Hackernews,
    Npm,
    Citations,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Github => "github",
            SourceKind::Hackernews => "hackernews",
            SourceKind::Npm => "npm",
            SourceKind::Citations => "citations",
        }
    }
}

/// Build the client for a domain from configuration
pub fn build_source(kind: SourceKind, config: &Config) -> anyhow::Result<Box<dyn EntitySource>> {
    Ok(match kind {
        SourceKind::Github => Box::new(GitHubClient::new(config.sources.github.clone())?),
        SourceKind::Hackernews => {
            Box::new(HackerNewsClient::new(config.sources.hackernews.clone()))
        }
        SourceKind::Npm => Box::new(NpmClient::new(config.sources.npm.clone())),
        SourceKind::Citations => Box::new(CitationsClient::new(config.sources.citations.clone())),
    })
}
