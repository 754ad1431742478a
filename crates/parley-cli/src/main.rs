//! CLI entry point.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parley_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads PARLEY_BACKEND_URL
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = CliConfig::from_cli(&cli).context("Failed to resolve configuration")?;
    let ctx = bootstrap(config);

    match cli.command {
        Commands::Say {
            text,
            bootstrap,
            attachments,
        } => {
            handlers::say::execute(&ctx, text, bootstrap, &attachments).await?;
        }
        Commands::Feed { cameras, duration } => {
            handlers::feed::execute(&ctx, &cameras, duration).await?;
        }
        Commands::Replay { path, bootstrap } => {
            handlers::replay::execute(&ctx, &path, bootstrap).await?;
        }
    }

    Ok(())
}
