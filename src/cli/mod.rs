//! CLI module for orgdir
//!
//! Provides command-line interface for:
//! - serve: Boot the store and serve the HTTP API
//! - init-schema: Create PostgreSQL tables
//! - check-config: Validate configuration and exit

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, init_schema, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
