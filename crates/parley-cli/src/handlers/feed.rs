//! Feed command handler.
//!
//! Watches one or more camera feeds, printing every state change. While
//! running, stdin accepts `retry`, `offline`, `online` and `quit`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parley_core::{ConnectivityEvent, FeedConnectionState};
use parley_runtime::{FeedWall, StreamReconnector};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bootstrap::CliContext;

/// Operator input while watching feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Retry,
    Connectivity(ConnectivityEvent),
    Quit,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "retry" => Some(Control::Retry),
        "offline" => Some(Control::Connectivity(ConnectivityEvent::Offline)),
        "online" => Some(Control::Connectivity(ConnectivityEvent::Online)),
        "q" | "quit" | "exit" => Some(Control::Quit),
        _ => None,
    }
}

/// Execute the feed command.
pub async fn execute(ctx: &CliContext, cameras: &[u32], duration: Option<u64>) -> Result<()> {
    let wall = ctx.feed_wall(cameras)?;
    if wall.feeds().is_empty() {
        println!("No cameras configured.");
        return Ok(());
    }

    let watchers: Vec<JoinHandle<()>> = wall.feeds().iter().map(|feed| watch_feed(Arc::clone(feed))).collect();
    wall.start().await;

    println!("Watching {} feed(s). Type 'retry', 'offline', 'online' or 'quit'.", wall.feeds().len());
    let stop = CancellationToken::new();
    if let Some(secs) = duration {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            stop.cancel();
        });
    }

    drive(&wall, &stop).await?;

    for watcher in watchers {
        watcher.abort();
    }
    print_summary(&wall);
    wall.teardown().await;
    Ok(())
}

async fn drive(wall: &FeedWall, stop: &CancellationToken) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            () = stop.cancelled() => return Ok(()),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                return Ok(());
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match parse_control(&line) {
                    Some(Control::Retry) => {
                        let retried = wall.retry_all();
                        println!("Retrying {retried} feed(s)");
                    }
                    Some(Control::Connectivity(event)) => wall.set_connectivity(event),
                    Some(Control::Quit) => return Ok(()),
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command: {}", line.trim()),
                }
            }
        }
    }
}

fn watch_feed(feed: Arc<StreamReconnector>) -> JoinHandle<()> {
    let mut states = feed.subscribe();
    tokio::spawn(async move {
        let label = feed.endpoint().label.clone();
        println!("{}", describe(&label, &states.borrow_and_update()));
        while states.changed().await.is_ok() {
            let line = describe(&label, &states.borrow_and_update());
            println!("{line}");
        }
    })
}

fn describe(label: &str, state: &FeedConnectionState) -> String {
    match state {
        FeedConnectionState::Connecting => format!("⋯ {label}: connecting"),
        FeedConnectionState::Live => format!("● {label}: live"),
        FeedConnectionState::Error { reason } => format!("✗ {label}: {reason}"),
    }
}

fn print_summary(wall: &FeedWall) {
    println!();
    for feed in wall.feeds() {
        let resolution = feed
            .status()
            .and_then(|status| status.resolution_label())
            .unwrap_or_else(|| "--".to_string());
        println!("{:<20} {:<12} {}", feed.endpoint().label, state_word(&feed.state()), resolution);
    }
}

fn state_word(state: &FeedConnectionState) -> &'static str {
    match state {
        FeedConnectionState::Connecting => "connecting",
        FeedConnectionState::Live => "live",
        FeedConnectionState::Error { .. } => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls() {
        assert_eq!(parse_control(" Retry\n"), Some(Control::Retry));
        assert_eq!(
            parse_control("offline"),
            Some(Control::Connectivity(ConnectivityEvent::Offline))
        );
        assert_eq!(parse_control("q"), Some(Control::Quit));
        assert_eq!(parse_control("reload"), None);
    }

    #[test]
    fn describes_errors_with_reason() {
        let line = describe("global top view", &FeedConnectionState::error("Webcam not available"));
        assert_eq!(line, "✗ global top view: Webcam not available");
    }
}
