//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synthesize one assistant message and play it
    Say {
        /// Text to speak
        text: String,

        /// Play the welcome clip first
        #[arg(long)]
        bootstrap: bool,

        /// Upload files to the backend first and print their annotations
        #[arg(long = "attach", short = 'a')]
        attachments: Vec<PathBuf>,
    },

    /// Connect to camera feeds and report their state
    Feed {
        /// Camera indices to watch (defaults to every configured camera)
        #[arg(long = "camera", short = 'c')]
        cameras: Vec<u32>,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Replay a recorded transcript (JSON lines) through the speech binder
    Replay {
        /// File with one `{"messages": [...], "is_generating": bool}` per line
        path: PathBuf,

        /// Play the welcome clip first
        #[arg(long)]
        bootstrap: bool,
    },
}
