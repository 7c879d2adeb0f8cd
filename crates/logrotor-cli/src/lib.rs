//! Logrotor CLI library.
//!
//! This library provides the core functionality for the `logrotor` command-line
//! interface, including settings management, command execution, logging setup
//! and output formatting.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod settings;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
pub use settings::Settings;
