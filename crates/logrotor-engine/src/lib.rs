//! Logrotor Engine
//!
//! Rotation and retention for the entries of a logrotor configuration file.
//!
//! # Overview
//!
//! For every entry, in declaration order, the engine:
//! - **Resolves a policy**: directive values are validated before any file is touched
//! - **Classifies each path**: missing, directory (walked when `recursive`),
//!   artifact of an earlier rotation (ignored) or primary file
//! - **Evaluates criteria**: `maxsize`, `maxage` and calendar frequencies, conjunctively
//! - **Rotates or deletes**: shifts retained generations, compresses, fires scripts,
//!   optionally creates a fresh empty primary
//!
//! # Generations
//!
//! | `rotate` | `start` | Primary moves to | Oldest kept |
//! |----------|---------|------------------|-------------|
//! | 3 | 1 (default) | `app.log.1` | `app.log.3` |
//! | 12 | 0 | `app.log.00` | `app.log.12` |
//! | 0 or absent | | deleted | |
//!
//! # Usage
//!
//! ## One-time Run
//!
//! ```no_run
//! use logrotor_engine::{EngineConfig, RotationEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = RotationEngine::system(EngineConfig::default());
//!
//! let metrics = engine.run_file("/etc/logrotor.conf")?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use logrotor_engine::{EngineConfig, RotationEngine, RotationWorker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let engine = RotationEngine::system(config.clone());
//!     let mut worker = RotationWorker::new(engine, "/etc/logrotor.conf", config.interval());
//!
//!     // Run until Ctrl+C
//!     worker.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Engine behaviour is independent of the stanza file and can be read from TOML:
//!
//! ```toml
//! dry_run = false
//! shift_strategy = "rename"   # or "recompress"
//! tar_program = "tar"
//! shell = "sh"
//! interval_minutes = 60
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod criteria;
mod error;
mod metrics;
pub mod policy;
mod processor;
pub mod rotation;
pub mod scripts;
pub mod system;
pub mod walker;
mod worker;

pub use config::{EngineConfig, ShiftStrategy};
pub use error::{EngineError, Result};
pub use metrics::RotationMetrics;
pub use policy::{EntryPolicy, Frequency};
pub use processor::RotationEngine;
pub use system::{ShellRunner, SystemError, TarArchiver};
pub use walker::WalkdirWalker;
pub use worker::RotationWorker;
