//! Error types for rotation runs

use logrotor_domain::CompressionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a rotation run
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid directive value in an entry
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported compression extension
    #[error("Configuration error: {0}")]
    Compression(#[from] CompressionError),

    /// Configuration file could not be loaded
    #[error(transparent)]
    Parse(#[from] logrotor_config::ConfigError),

    /// Filesystem operation failed
    #[error("Failed to {op} {}: {source}", .path.display())]
    Io {
        /// Operation that failed (rename, delete, ...)
        op: &'static str,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archiving tool failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// A script exited unsuccessfully
    #[error("Script error: {0}")]
    Script(String),

    /// Directory traversal failed
    #[error("Walk error: {0}")]
    Walk(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl EngineError {
    /// Wrap an I/O error with the operation and path it concerns
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
