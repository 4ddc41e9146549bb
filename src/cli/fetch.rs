//! Fetch command implementation

use clap::Args;

use crate::config::Config;
use crate::source::{build_source, CachedSource, EntitySource, SourceKind};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Data source to collect from
    #[arg(long, value_enum)]
    pub source: SourceKind,

    /// Maximum number of entities to collect
    #[arg(long, default_value = "200")]
    pub limit: usize,

    /// Discard any existing snapshot and refetch
    #[arg(long)]
    pub refresh: bool,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = build_source(self.source, config)?;
        let cached = CachedSource::new(source, &config.cache.dir);

        if self.refresh {
            cached.invalidate()?;
        }

        let entities = cached.collect(self.limit).await?;
        tracing::info!(
            source = self.source.as_str(),
            entities = entities.len(),
            snapshot = %cached.snapshot_path().display(),
            "Fetch complete"
        );
        println!(
            "{}: {} entities cached at {}",
            self.source.as_str(),
            entities.len(),
            cached.snapshot_path().display()
        );
        Ok(())
    }
}
