//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Drive the parley speech and video-feed controller from the terminal.
#[derive(Debug, Parser)]
#[command(name = "parley")]
#[command(about = "Speak assistant messages and watch robot camera feeds")]
#[command(version)]
pub struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend origin, e.g. http://localhost:8000
    #[arg(long = "backend-url", env = "PARLEY_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Directory static assets like /intro.wav are resolved against
    #[arg(long = "assets-dir", global = true)]
    pub assets_dir: Option<PathBuf>,

    /// Retry failed feeds automatically with exponential backoff
    #[arg(long = "feed-backoff", global = true)]
    pub feed_backoff: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
