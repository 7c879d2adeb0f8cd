//! Error types for configuration parsing

use logrotor_domain::ScriptKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort configuration parsing
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file is missing
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Configuration could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Directive outside a stanza, or in a stanza that has no paths yet
    #[error("line {line}: No paths provided ahead of stanza")]
    NoStanza {
        /// 1-based line number
        line: usize,
    },

    /// Stanza opened while another one is still open
    #[error("line {line}: stanza opened inside the stanza opened on line {opened}")]
    NestedStanza {
        /// 1-based line number
        line: usize,
        /// Line of the stanza still open
        opened: usize,
    },

    /// Closing brace with no open stanza
    #[error("line {line}: '}}' without an open stanza")]
    UnexpectedClose {
        /// 1-based line number
        line: usize,
    },

    /// End of input inside a stanza
    #[error("stanza opened on line {line} is never closed")]
    UnterminatedStanza {
        /// Line the stanza was opened on
        line: usize,
    },

    /// End of input inside a script body
    #[error("{kind} script opened on line {line} has no endscript")]
    UnterminatedScript {
        /// Script trigger
        kind: ScriptKind,
        /// Line the script was opened on
        line: usize,
    },
}
