//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Ask the context for composed runtime pieces
//! - Drive them until done or Ctrl-C, then tear down
//! - Format output for the terminal

pub mod feed;
pub mod replay;
pub mod say;

use anyhow::Result;
use parley_runtime::ChatView;

/// Wait until the view has no pending speech work, or Ctrl-C.
///
/// Returns `true` when interrupted.
pub(crate) async fn settle_or_interrupt(view: &ChatView) -> Result<bool> {
    tokio::select! {
        () = view.settle() => Ok(false),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("\nInterrupted, stopping playback.");
            Ok(true)
        }
    }
}
