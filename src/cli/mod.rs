//! CLI interface for ws-tether
//!
//! Provides subcommands for:
//! - `run`: Connect to an endpoint and print observer callbacks
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ws-tether")]
#[command(about = "Reconnecting WebSocket client with exponential backoff")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect and print messages, errors, and state changes
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}
