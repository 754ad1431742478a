//! Settings resolution for the CLI.
//!
//! Precedence (lowest to highest): built-in defaults, the JSON settings
//! file, then flags and environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parley_core::{BackoffSettings, Settings, validate_settings};

use crate::parser::Cli;

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings: Settings,
    /// Directory static assets (the welcome clip) are resolved against.
    pub assets_dir: PathBuf,
}

impl CliConfig {
    /// Defaults only.
    pub fn with_defaults() -> Self {
        Self {
            settings: Settings::with_defaults(),
            assets_dir: PathBuf::from("."),
        }
    }

    /// Resolve configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => load_settings_file(path)?,
            None => Settings::with_defaults(),
        };

        if let Some(url) = &cli.backend_url {
            settings.backend_url.clone_from(url);
        }
        if cli.feed_backoff && settings.feed_backoff.is_none() {
            settings.feed_backoff = Some(BackoffSettings::default());
        }

        validate_settings(&settings).context("Invalid settings")?;
        tracing::debug!(backend = %settings.backend_url, "Settings resolved");

        Ok(Self {
            settings,
            assets_dir: cli.assets_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

fn load_settings_file(path: &Path) -> Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    Settings::from_json_str(&raw)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}
