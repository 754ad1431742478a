//! Say command handler.
//!
//! Feeds one finalized assistant message through the speech binder, exactly
//! as a chat view would after generation finishes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parley_core::{ChatMessage, UploadFile};
use parley_runtime::{BinderDecision, ChatView};

use crate::bootstrap::CliContext;
use crate::handlers::settle_or_interrupt;

/// Identifier of the message spoken by `parley say`.
const SAY_MESSAGE_ID: &str = "say";

/// Execute the say command.
pub async fn execute(
    ctx: &CliContext,
    text: String,
    bootstrap: bool,
    attachments: &[PathBuf],
) -> Result<()> {
    let view = ctx.chat_view()?;

    if !attachments.is_empty() {
        upload_attachments(&view, attachments).await?;
    }

    if bootstrap {
        view.start_bootstrap();
    }

    let messages = [ChatMessage::assistant(SAY_MESSAGE_ID, text)];
    match view.on_messages(&messages, false) {
        BinderDecision::Admitted(_) => {}
        BinderDecision::TooShort { len } => {
            println!("Message too short to speak ({len} characters).");
        }
        other => println!("Nothing to speak: {other:?}"),
    }

    settle_or_interrupt(&view).await?;
    view.teardown();
    Ok(())
}

async fn upload_attachments(view: &ChatView, paths: &[PathBuf]) -> Result<()> {
    let Some(tray) = view.tray() else {
        return Ok(());
    };

    for path in paths {
        let file = read_upload(path)?;
        tray.upload(&file)
            .await
            .with_context(|| format!("Failed to upload {}", path.display()))?;
    }

    for annotation in tray.take_annotations() {
        println!("📎 {}: {}", annotation.kind, annotation.data);
    }
    Ok(())
}

fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile {
        mime: mime_for_path(path).to_string(),
        name,
        bytes,
    })
}

/// MIME type from the file extension.
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
