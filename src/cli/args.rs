//! CLI argument definitions using clap
//!
//! Commands:
//! - carlot serve [--config <path>] [--port <port>]
//! - carlot check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// carlot - an in-memory car catalogue over HTML and JSON
#[derive(Parser, Debug)]
#[command(name = "carlot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the config file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Path to configuration file
        #[arg(long)]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
