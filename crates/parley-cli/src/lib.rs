//! Command-line driver for parley.
//!
//! Composes the HTTP adapters, an audio output and the runtime state
//! machines, then exposes them as `say`, `feed` and `replay` commands.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary entry point only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod output;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use config::CliConfig;
pub use parser::Cli;
