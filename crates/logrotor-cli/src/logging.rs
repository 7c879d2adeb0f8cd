//! Logging setup.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::settings::Settings;
use tracing_subscriber::EnvFilter;

/// Pick the logging level: `--verbose`, then `--log-level`, then the settings file.
pub fn resolve_level(cli: &Cli, settings: &Settings) -> String {
    if cli.verbose {
        return "debug".to_string();
    }
    match cli.log_level {
        Some(level) => level.as_str().to_string(),
        None => settings.log_level.clone(),
    }
}

/// Install the stderr subscriber.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| CliError::Config(format!("invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}
