//! Analyze command implementation

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::classifier::{rank_and_split, summarize, EffectReport, SplitMode};
use crate::config::{AnalysisConfig, Config};
use crate::source::{build_source, CachedSource, EntitySource, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Data source whose entities to analyze
    #[arg(long, value_enum)]
    pub source: SourceKind,

    /// Maximum number of entities to analyze
    #[arg(long, default_value = "200")]
    pub limit: usize,

    /// Override the configured percentile split (top/bottom percent)
    #[arg(long)]
    pub percentile: Option<f64>,

    /// Override the configured outcome horizon
    #[arg(long)]
    pub horizon: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Also write the JSON run record to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Envelope written for reporting collaborators; the report itself stays a
/// pure function of the inputs, the envelope carries run provenance
#[derive(Debug, Serialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub n_entities: usize,
    pub report: EffectReport,
}

impl AnalyzeArgs {
    fn analysis_config(&self, config: &Config) -> AnalysisConfig {
        let mut analysis = match self.source {
            SourceKind::Github => config.sources.github.analysis.clone(),
            SourceKind::Hackernews => config.sources.hackernews.analysis.clone(),
            SourceKind::Npm => config.sources.npm.analysis.clone(),
            SourceKind::Citations => config.sources.citations.analysis.clone(),
        };
        if let Some(percent) = self.percentile {
            analysis.split = SplitMode::Percentile { percent };
        }
        if let Some(horizon) = &self.horizon {
            analysis.outcome_horizon = horizon.clone();
        }
        analysis
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let analysis = self.analysis_config(config);
        analysis.validate()?;

        let source = build_source(self.source, config)?;
        let cached = CachedSource::new(source, &config.cache.dir);
        let entities = cached.collect(self.limit).await?;
        tracing::info!(
            source = self.source.as_str(),
            entities = entities.len(),
            "Running momentum comparison"
        );

        let split = rank_and_split(
            &entities,
            &analysis.velocity,
            &analysis.outcome_horizon,
            &analysis.split,
        )?;
        let report = summarize(&split);

        let record = RunRecord {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: self.source.as_str().to_string(),
            n_entities: entities.len(),
            report,
        };

        match self.format {
            OutputFormat::Table => print!("{}", record.report.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        }

        if let Some(path) = &self.output {
            std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
            tracing::info!(path = %path.display(), "Run record written");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::VelocityMethod;

    fn args(source: SourceKind) -> AnalyzeArgs {
        AnalyzeArgs {
            source,
            limit: 100,
            percentile: None,
            horizon: None,
            format: OutputFormat::Table,
            output: None,
        }
    }

    #[test]
    fn test_analysis_config_uses_per_source_defaults() {
        let config = Config::default();

        let github = args(SourceKind::Github).analysis_config(&config);
        assert!(matches!(
            github.velocity,
            VelocityMethod::TimeToThreshold { threshold: 100, .. }
        ));
        assert_eq!(github.outcome_horizon, "acceleration");

        let npm = args(SourceKind::Npm).analysis_config(&config);
        assert!(matches!(npm.split, SplitMode::Percentile { .. }));
        assert_eq!(npm.outcome_horizon, "recent_downloads");
    }

    #[test]
    fn test_overrides_replace_split_and_horizon() {
        let config = Config::default();
        let mut args = args(SourceKind::Github);
        args.percentile = Some(10.0);
        args.horizon = Some("stars_sampled".to_string());

        let analysis = args.analysis_config(&config);
        assert_eq!(analysis.split, SplitMode::Percentile { percent: 10.0 });
        assert_eq!(analysis.outcome_horizon, "stars_sampled");
    }
}
