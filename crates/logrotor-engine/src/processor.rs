//! Entry processing: walks every declared path of every entry
//!
//! The processor decides, per path, whether it is missing, a directory, an
//! artifact of an earlier rotation or a primary file, and hands eligible
//! primaries to the [`Rotator`].

use crate::config::EngineConfig;
use crate::criteria::{evaluate, FileFacts};
use crate::error::{EngineError, Result};
use crate::metrics::RotationMetrics;
use crate::policy::EntryPolicy;
use crate::rotation::{stat, Rotator};
use crate::system::{ShellRunner, TarArchiver};
use crate::walker::WalkdirWalker;
use chrono::{DateTime, Local, TimeZone, Utc};
use logrotor_domain::artifact::ordinal_suffix;
use logrotor_domain::traits::{Archiver, PathWalker, ScriptRunner};
use logrotor_domain::RotationEntry;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

/// The rotation engine
///
/// Owns the injected capabilities and accumulates [`RotationMetrics`] across
/// runs.
pub struct RotationEngine<A, R, W> {
    config: EngineConfig,
    archiver: A,
    runner: R,
    walker: W,
    metrics: RotationMetrics,
}

impl RotationEngine<TarArchiver, ShellRunner, WalkdirWalker> {
    /// Engine backed by `tar`, the configured shell and a real directory walk
    pub fn system(config: EngineConfig) -> Self {
        let archiver = TarArchiver::new(config.tar_program.clone());
        let runner = ShellRunner::new(config.shell.clone());
        Self::new(config, archiver, runner, WalkdirWalker::new())
    }
}

impl<A, R, W> RotationEngine<A, R, W>
where
    A: Archiver,
    A::Error: Display,
    R: ScriptRunner,
    R::Error: Display,
    W: PathWalker,
    W::Error: Display,
{
    /// Create an engine from its capabilities
    pub fn new(config: EngineConfig, archiver: A, runner: R, walker: W) -> Self {
        Self {
            config,
            archiver,
            runner,
            walker,
            metrics: RotationMetrics::new(),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metrics accumulated so far
    pub fn metrics(&self) -> &RotationMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// The archiver in use
    pub fn archiver(&self) -> &A {
        &self.archiver
    }

    /// The script runner in use
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Load a configuration file and run it
    pub fn run_file<P: AsRef<Path>>(&mut self, conf: P) -> Result<RotationMetrics> {
        let entries = logrotor_config::load(conf)?;
        self.run(&entries)
    }

    /// Perform one full run over `entries`
    ///
    /// Every entry's policy is resolved before anything is touched, so a bad
    /// directive aborts the run with the filesystem unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first configuration or operation error. Operations already
    /// carried out are not rolled back.
    pub fn run(&mut self, entries: &[RotationEntry]) -> Result<RotationMetrics> {
        let started = Instant::now();

        let policies = entries
            .iter()
            .map(EntryPolicy::resolve)
            .collect::<Result<Vec<_>>>()?;

        if self.config.dry_run {
            tracing::info!("DRY RUN: no file will be modified");
        }

        let now = Local::now();
        for policy in &policies {
            self.process_entry(policy, &now)?;
        }

        self.metrics
            .record_run(started.elapsed().as_millis().try_into().unwrap_or(u64::MAX));
        Ok(self.metrics.clone())
    }

    fn process_entry<Tz: TimeZone>(&mut self, policy: &EntryPolicy, now: &DateTime<Tz>) -> Result<()> {
        tracing::debug!("processing {} path(s)", policy.paths.len());

        let Self {
            config,
            archiver,
            runner,
            walker,
            metrics,
        } = self;
        let mut rotator = Rotator::new(policy, config, archiver, runner, metrics);

        for path in &policy.paths {
            let meta = match stat(path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    rotator.metrics().record_missing();
                    if policy.missing_ok {
                        tracing::info!("{} does not exist, skipping", path.display());
                        continue;
                    }
                    tracing::info!(
                        "{} does not exist and nomissingok is set, skipping remaining paths",
                        path.display()
                    );
                    break;
                }
                Err(e) => return Err(EngineError::io("stat", path, e)),
            };

            if !meta.is_dir() {
                process_file(&mut rotator, policy, path, now)?;
                continue;
            }

            if !policy.recursive {
                tracing::info!("{} is a directory but recursion is not enabled", path.display());
                rotator.metrics().record_directory_skipped();
                continue;
            }

            let files = walker
                .walk(path)
                .map_err(|e| EngineError::Walk(format!("{}: {}", path.display(), e)))?;
            for file in files {
                process_file(&mut rotator, policy, &file, now)?;
            }
        }
        Ok(())
    }
}

fn process_file<A, R, Tz>(
    rotator: &mut Rotator<'_, A, R>,
    policy: &EntryPolicy,
    path: &Path,
    now: &DateTime<Tz>,
) -> Result<()>
where
    A: Archiver,
    A::Error: Display,
    R: ScriptRunner,
    R::Error: Display,
    Tz: TimeZone,
{
    if let Some(artifact) = policy.naming.matches(path) {
        tracing::debug!(
            "{} after {}{} rotation of {}, ignoring",
            path.display(),
            artifact.generation,
            ordinal_suffix(artifact.generation),
            artifact.primary.display()
        );
        rotator.metrics().record_artifact_ignored();
        return Ok(());
    }

    let meta = stat(path).map_err(|e| EngineError::io("stat", path, e))?;
    let modified = meta.modified().map_err(|e| EngineError::io("stat", path, e))?;
    let facts = FileFacts {
        size: meta.len(),
        modified: DateTime::<Utc>::from(modified),
        last_rotation: last_rotation(policy, path),
    };

    let verdict = evaluate(path, policy, &facts, now);
    for reason in &verdict.reasons {
        tracing::info!("{}", reason);
    }
    if !verdict.eligible {
        tracing::info!("{} does not meet its rotation criteria, skipping", path.display());
        rotator.metrics().record_skip();
        return Ok(());
    }

    rotator.apply(path)?;
    rotator.create(path)
}

/// Modification time of the generation in the start slot
fn last_rotation(policy: &EntryPolicy, path: &Path) -> Option<DateTime<Utc>> {
    policy.rotate?;
    let slot = policy.naming.slot(path, policy.start);
    policy
        .naming
        .compressed(&slot)
        .into_iter()
        .chain(std::iter::once(slot))
        .find_map(|candidate| fs::metadata(candidate).and_then(|m| m.modified()).ok())
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrotor_config::parse_config;

    #[test]
    fn test_last_rotation_prefers_compressed_slot() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("a.log");
        let text = format!("{} {{\nrotate 2\ncompress\n}}\n", log.display());
        let policy = EntryPolicy::resolve(&parse_config(&text).unwrap()[0]).unwrap();

        assert!(last_rotation(&policy, &log).is_none());

        fs::write(dir.path().join("a.log.1.tar.gz"), "").unwrap();
        assert!(last_rotation(&policy, &log).is_some());
    }

    #[test]
    fn test_last_rotation_without_retention() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("a.log");
        fs::write(dir.path().join("a.log.1"), "").unwrap();
        let text = format!("{} {{\ndaily\n}}\n", log.display());
        let policy = EntryPolicy::resolve(&parse_config(&text).unwrap()[0]).unwrap();

        assert!(last_rotation(&policy, &log).is_none());
    }
}
