//! CLI interface for momentum-lab
//!
//! Provides subcommands for:
//! - `fetch`: collect entities from a source into the snapshot cache
//! - `analyze`: run the momentum comparison over a source's entities
//! - `config`: show effective configuration

mod analyze;
mod fetch;

pub use analyze::AnalyzeArgs;
pub use fetch::FetchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "momentum-lab")]
#[command(about = "Early-momentum cohort analysis across public activity data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect entities from a source into the snapshot cache
    Fetch(FetchArgs),
    /// Run the momentum comparison over a source's entities
    Analyze(AnalyzeArgs),
    /// Show effective configuration
    Config,
}
