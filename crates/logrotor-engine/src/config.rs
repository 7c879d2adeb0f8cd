//! Configuration for rotation runs
//!
//! Controls how the engine carries out rotations, independently of the
//! stanza file that says what to rotate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted worker interval, one year in minutes
pub const MAX_INTERVAL_MINUTES: u64 = 366 * 24 * 60;

/// How retained generations move up one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStrategy {
    /// Rename compressed artifacts as they are
    #[default]
    Rename,

    /// Extract each compressed artifact, rename it, then compress it again
    Recompress,
}

/// Configuration for the rotation engine
///
/// # Examples
///
/// ```
/// use logrotor_engine::{EngineConfig, ShiftStrategy};
///
/// let config = EngineConfig::default();
/// assert!(!config.dry_run);
/// assert_eq!(config.shift_strategy, ShiftStrategy::Rename);
///
/// // Report what would happen without touching anything
/// let config = EngineConfig::preview();
/// assert!(config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dry-run mode: log every decision without renaming, compressing,
    /// deleting, creating or running scripts
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// How generations are shifted
    /// Default: rename
    #[serde(default)]
    pub shift_strategy: ShiftStrategy,

    /// Archiving tool invoked for compress and extract
    /// Default: "tar"
    #[serde(default = "default_tar_program")]
    pub tar_program: String,

    /// Shell used to run script bodies with `-c`
    /// Default: "sh"
    #[serde(default = "default_shell")]
    pub shell: String,

    /// How often the background worker runs (in minutes)
    /// Default: 60
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

fn default_tar_program() -> String {
    "tar".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_interval_minutes() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            shift_strategy: ShiftStrategy::Rename,
            tar_program: default_tar_program(),
            shell: default_shell(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl EngineConfig {
    /// Dry-run configuration
    pub fn preview() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Get the worker interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_minutes == 0 {
            return Err("interval_minutes must be greater than 0".to_string());
        }
        if self.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(format!(
                "interval_minutes must be at most {} (one year)",
                MAX_INTERVAL_MINUTES
            ));
        }
        if self.tar_program.trim().is_empty() {
            return Err("tar_program must not be empty".to_string());
        }
        if self.shell.trim().is_empty() {
            return Err("shell must not be empty".to_string());
        }
        Ok(())
    }
}
