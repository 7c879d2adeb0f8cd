//! Logrotor Domain Layer
//!
//! This crate contains the core vocabulary of logrotor. It has ZERO external
//! dependencies and defines the value objects and trait interfaces that the
//! parser, the engine and the CLI all depend upon.
//!
//! ## Key Concepts
//!
//! - **Rotation entry**: One stanza of the configuration language, i.e. a set of
//!   target paths and the directives that govern them
//! - **Quantity**: A magnitude with a unit suffix (`10k`, `7d`) normalized to
//!   bytes or seconds
//! - **Compression spec**: An archive extension (`.tar.gz`) and the tar filter
//!   it selects
//! - **Artifact**: A retained generation `<path>.<NNN>[<ext>]` left behind by a
//!   previous rotation
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure logic only, no filesystem access
//! - Archiving, script execution and directory traversal are expressed as traits
//!   implemented by the engine crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod compression;
pub mod entry;
pub mod traits;
pub mod units;

// Re-exports for convenience
pub use artifact::{ArtifactMatch, ArtifactNaming};
pub use compression::{CompressionError, CompressionFilter, CompressionSpec};
pub use entry::{DirectiveValue, RotationEntry, ScriptKind};
pub use units::{Quantity, UnitError};
