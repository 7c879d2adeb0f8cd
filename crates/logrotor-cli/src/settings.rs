//! Settings file management for the CLI.
//!
//! The settings file controls how logrotor behaves; the configuration file
//! passed on the command line controls what it rotates.

use crate::error::{CliError, Result};
use logrotor_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI settings.
///
/// ```toml
/// log_level = "info"
/// format = "table"
/// color = true
/// dry_run = false
/// shift_strategy = "rename"
/// interval_minutes = 60
/// tar_program = "tar"
/// shell = "sh"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Logging level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Engine behaviour
    #[serde(flatten)]
    pub engine: EngineConfig,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".logrotor").join("config.toml"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default path is used when
    /// present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "Settings file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        Self::from_file(&path)
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            format: OutputFormat::Table,
            color: true,
            engine: EngineConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrotor_engine::ShiftStrategy;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.format, OutputFormat::Table);
        assert!(settings.color);
        assert_eq!(settings.engine, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        writeln!(file, "format = \"json\"").unwrap();
        writeln!(file, "dry_run = true").unwrap();
        writeln!(file, "shift_strategy = \"recompress\"").unwrap();
        writeln!(file, "interval_minutes = 15").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.color);
        assert!(settings.engine.dry_run);
        assert_eq!(settings.engine.shift_strategy, ShiftStrategy::Recompress);
        assert_eq!(settings.engine.interval_minutes, 15);
        assert_eq!(settings.engine.tar_program, "tar");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("none.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = [").unwrap();
        assert!(matches!(Settings::from_file(file.path()), Err(CliError::Toml(_))));
    }
}
