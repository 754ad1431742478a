//! Replay command handler.
//!
//! Plays back a recorded chat transcript: each line is one snapshot of the
//! message list, fed to the speech binder in order with a short pause, the
//! way a streaming chat session would update the view.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use parley_core::ChatMessage;
use serde::Deserialize;

use crate::bootstrap::CliContext;
use crate::handlers::settle_or_interrupt;

/// Pause between snapshots that don't specify their own.
const DEFAULT_FRAME_GAP_MS: u64 = 50;

/// One recorded snapshot of the chat session.
#[derive(Debug, Clone, Deserialize)]
struct TranscriptFrame {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    is_generating: bool,
    /// Pause before the next snapshot.
    #[serde(default)]
    gap_ms: Option<u64>,
}

/// Execute the replay command.
pub async fn execute(ctx: &CliContext, path: &Path, bootstrap: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    let frames = parse_transcript(&raw)
        .with_context(|| format!("Invalid transcript {}", path.display()))?;
    println!("Replaying {} snapshot(s) from {}", frames.len(), path.display());

    let view = ctx.chat_view()?;
    if bootstrap {
        view.start_bootstrap();
    }

    for frame in &frames {
        let decision = view.on_messages(&frame.messages, frame.is_generating);
        tracing::debug!(?decision, messages = frame.messages.len(), "Snapshot applied");
        tokio::time::sleep(Duration::from_millis(frame.gap_ms.unwrap_or(DEFAULT_FRAME_GAP_MS))).await;
    }

    let interrupted = settle_or_interrupt(&view).await?;
    if !interrupted {
        println!("Spoke {} message(s).", view.processed().len());
    }
    view.teardown();
    Ok(())
}

/// Parse a JSON-lines transcript. Blank lines are skipped.
fn parse_transcript(raw: &str) -> Result<Vec<TranscriptFrame>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))
        })
        .collect()
}
