//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Logrotor - rotate, compress and expire log files.
#[derive(Debug, Parser)]
#[command(name = "logrotor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to run (same as `logrotor run <CONF>`)
    pub conf: Option<PathBuf>,

    /// Settings file (default: ~/.logrotor/config.toml)
    #[arg(long, global = true, env = "LOGROTOR_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging level
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Report what would be done without changing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// Logging levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Progress messages
    Info,
    /// Internal decisions
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Perform one rotation run
    Run(RunArgs),

    /// Parse and validate a configuration file without touching any file
    Check(CheckArgs),

    /// Run the configuration on a schedule until interrupted
    Watch(WatchArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Configuration file
    pub conf: PathBuf,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Configuration file
    pub conf: PathBuf,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Configuration file
    pub conf: PathBuf,

    /// Minutes between runs (overrides the settings file)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl From<CliFormat> for crate::settings::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::settings::OutputFormat::Table,
            CliFormat::Json => crate::settings::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_conf_path() {
        let cli = Cli::parse_from(["logrotor", "/etc/logrotor.conf"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.conf, Some(PathBuf::from("/etc/logrotor.conf")));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["logrotor", "--dry-run", "run", "/etc/logrotor.conf"]);
        assert!(cli.dry_run);
        match cli.command {
            Some(Command::Run(args)) => assert_eq!(args.conf, PathBuf::from("/etc/logrotor.conf")),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_watch_interval() {
        let cli = Cli::parse_from(["logrotor", "watch", "a.conf", "--interval", "5", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Command::Watch(args)) => assert_eq!(args.interval, Some(5)),
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["logrotor", "check", "a.conf", "--format", "json", "--log-level", "warn"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.log_level, Some(LogLevel::Warn));
    }
}
