//! Script firing for one entry
//!
//! Shared scripts fire at most once per entry per run. The fired set lives
//! here, not on the entry, so a later run starts fresh.

use crate::error::{EngineError, Result};
use logrotor_domain::traits::ScriptRunner;
use logrotor_domain::ScriptKind;
use std::collections::HashSet;

/// Tracks which scripts already fired for the entry being processed
#[derive(Debug, Default)]
pub struct ScriptScheduler {
    shared: bool,
    fired: HashSet<ScriptKind>,
}

impl ScriptScheduler {
    /// Scheduler for one entry
    pub fn new(shared: bool) -> Self {
        Self {
            shared,
            fired: HashSet::new(),
        }
    }

    /// Fire `kind` unless it has nothing to run or already fired as shared
    ///
    /// Returns whether the script fired. In dry-run mode the script counts as
    /// fired but the runner is not invoked.
    pub fn fire<R>(
        &mut self,
        runner: &mut R,
        kind: ScriptKind,
        commands: &[String],
        dry_run: bool,
    ) -> Result<bool>
    where
        R: ScriptRunner,
        R::Error: std::fmt::Display,
    {
        if commands.is_empty() {
            return Ok(false);
        }
        if self.shared && !self.fired.insert(kind) {
            tracing::debug!("{} already fired for this entry", kind);
            return Ok(false);
        }

        if dry_run {
            tracing::info!("DRY RUN: would run {} ({} command(s))", kind, commands.len());
            return Ok(true);
        }

        tracing::info!("running {}", kind);
        runner
            .run(kind, commands)
            .map_err(|e| EngineError::Script(format!("{}: {}", kind, e)))?;
        Ok(true)
    }
}
