//! CLI module for carlot
//!
//! Provides command-line interface for:
//! - serve: Boot the HTTP server
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, resolve_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
