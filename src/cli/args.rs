//! CLI argument definitions using clap
//!
//! Commands:
//! - orgdir serve [--config <path>]
//! - orgdir init-schema [--config <path>]
//! - orgdir check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// orgdir - read-only directory of organizations, buildings and activities
#[derive(Parser, Debug)]
#[command(name = "orgdir")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum log level: trace, info, warn, error, fatal
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file; environment alone is enough without it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create the PostgreSQL tables if they do not exist
    InitSchema {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate configuration, print it with secrets redacted
    CheckConfig {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
