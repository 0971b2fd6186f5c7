//! CLI command implementations

use std::io::{self, Write};
use std::path::Path;

use crate::http_server::{HttpServer, ServerConfig};
use crate::observability::Logger;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Resolve the effective configuration: file (or defaults), then overrides.
pub fn resolve_config(config_path: Option<&Path>, port: Option<u16>) -> CliResult<ServerConfig> {
    let mut config = match config_path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = port {
        config.port = port;
        config.validate()?;
    }

    Ok(config)
}

/// Start the HTTP server and block until it exits
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let config = resolve_config(config_path, port)?;
    Logger::set_min_severity(config.severity()?);

    let server = HttpServer::with_config(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate a configuration file and print it with defaults filled in
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = ServerConfig::load(config_path)?;
    // Builds the template and seed data, so those errors surface here too
    HttpServer::with_config(config.clone())?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &config)?;
    writeln!(stdout)?;
    Ok(())
}
