//! Trait definitions for external interactions
//!
//! These traits define the boundaries between rotation decisions and the
//! processes and filesystem walks that carry them out. Implementations live in
//! the engine crate.

use crate::{CompressionSpec, ScriptKind};
use std::path::{Path, PathBuf};

/// Trait for the archiving tool
///
/// Implemented by the engine crate (`TarArchiver`)
pub trait Archiver {
    /// Error type for archive operations
    type Error;

    /// Pack `file` into `<file><ext>`, removing `file` on success
    ///
    /// `work_dir` is the directory the archiving tool runs in. Returns the path
    /// of the created artifact.
    fn archive(
        &mut self,
        file: &Path,
        spec: &CompressionSpec,
        work_dir: &Path,
    ) -> Result<PathBuf, Self::Error>;

    /// Unpack `artifact` into `work_dir`, keeping the artifact
    ///
    /// Returns the paths of the extracted files.
    fn extract(
        &mut self,
        artifact: &Path,
        spec: &CompressionSpec,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, Self::Error>;
}

/// Trait for running script bodies
///
/// Implemented by the engine crate (`ShellRunner`)
pub trait ScriptRunner {
    /// Error type for script execution
    type Error;

    /// Run the commands of one script, in order
    fn run(&mut self, kind: ScriptKind, commands: &[String]) -> Result<(), Self::Error>;
}

/// Trait for enumerating rotation candidates under a directory
///
/// Implemented by the engine crate (`WalkdirWalker`)
pub trait PathWalker {
    /// Error type for traversal
    type Error;

    /// Candidate files under `root`, in visiting order
    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, Self::Error>;
}
