//! Logrotor Config
//!
//! Parses the stanza-based rotation configuration language into
//! [`RotationEntry`] values, and renders entries back into that language.
//!
//! # Format
//!
//! ```text
//! # comments start with '#'
//! /var/log/app.log /var/log/worker.log {
//!     rotate 5
//!     compress .tar.xz
//!     maxsize 10M
//!     sharedscripts
//!     postrotate
//!         systemctl reload app
//!     endscript
//! }
//! ```
//!
//! A stanza opens on a line containing `{`. Its paths are every `/`-prefixed
//! token on that line, on bare path lines before it, and on bare path lines
//! inside it. Directives are `name`, `name value` or `name=value`.
//! `prerotate`, `postrotate` and `preremove` open a script body that only
//! `endscript` closes.
//!
//! # Example Usage
//!
//! ```
//! use logrotor_config::parse_config;
//!
//! let entries = parse_config("/var/log/app.log {\n  rotate 3\n}\n").unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].paths, vec!["/var/log/app.log".to_string()]);
//! assert_eq!(entries[0].scalar("rotate"), Some("3"));
//! ```

#![warn(missing_docs)]

mod error;
mod parser;
mod render;

pub use error::ConfigError;
pub use parser::{load, parse_config, parse_reader, ConfigParser};
pub use render::render;

pub use logrotor_domain::RotationEntry;
