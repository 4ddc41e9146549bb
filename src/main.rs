use clap::Parser;
use momentum_lab::cli::{Cli, Commands};
use momentum_lab::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    momentum_lab::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Fetch(args) => {
            tracing::info!("Starting fetch");
            args.execute(&config).await?;
        }
        Commands::Analyze(args) => {
            tracing::info!("Starting analysis");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Cache dir: {}", config.cache.dir.display());
            println!("  Log level: {}", config.telemetry.log_level);
            println!("  GitHub query: {}", config.sources.github.query);
            println!(
                "  GitHub analysis: {:?} / {:?}",
                config.sources.github.analysis.velocity, config.sources.github.analysis.split
            );
            println!("  NPM queries: {}", config.sources.npm.queries.len());
            println!(
                "  HN window: {}h (min age {}h)",
                config.sources.hackernews.window_hours, config.sources.hackernews.min_age_hours
            );
            println!(
                "  Citations fields: {}, years: {:?}",
                config.sources.citations.fields.len(),
                config.sources.citations.years
            );
        }
    }

    Ok(())
}
