//! Generation shifting, compression, deletion and creation for one file
//!
//! With `rotate R` and `start S` a rotation shifts slots `R-1 .. S` up by one
//! (highest first so nothing is overwritten), moves the primary into slot `S`
//! and compresses it. Whatever sat in slot `R` is dropped.

use crate::config::{EngineConfig, ShiftStrategy};
use crate::error::{EngineError, Result};
use crate::metrics::RotationMetrics;
use crate::policy::EntryPolicy;
use crate::scripts::ScriptScheduler;
use crate::system::move_file;
use logrotor_domain::artifact::append_suffix;
use logrotor_domain::traits::{Archiver, ScriptRunner};
use logrotor_domain::{CompressionSpec, ScriptKind};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Whether anything, including a dangling symlink, exists at `path`
pub(crate) fn lexists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Metadata of `path`, or of the link itself when it dangles
pub(crate) fn stat(path: &Path) -> io::Result<fs::Metadata> {
    fs::metadata(path).or_else(|_| fs::symlink_metadata(path))
}

/// Carries out rotations for the files of one entry
///
/// Script firing state is scoped to the rotator, so shared scripts fire at
/// most once for the entry it was created for.
pub struct Rotator<'a, A, R> {
    policy: &'a EntryPolicy,
    config: &'a EngineConfig,
    archiver: &'a mut A,
    runner: &'a mut R,
    metrics: &'a mut RotationMetrics,
    scripts: ScriptScheduler,
}

impl<'a, A, R> Rotator<'a, A, R>
where
    A: Archiver,
    A::Error: Display,
    R: ScriptRunner,
    R::Error: Display,
{
    /// Create a rotator for one entry
    pub fn new(
        policy: &'a EntryPolicy,
        config: &'a EngineConfig,
        archiver: &'a mut A,
        runner: &'a mut R,
        metrics: &'a mut RotationMetrics,
    ) -> Self {
        Self {
            policy,
            config,
            archiver,
            runner,
            metrics,
            scripts: ScriptScheduler::new(policy.shared_scripts),
        }
    }

    /// Metrics shared with the caller
    pub fn metrics(&mut self) -> &mut RotationMetrics {
        self.metrics
    }

    /// Rotate or delete `path` according to the entry's retention
    pub fn apply(&mut self, path: &Path) -> Result<()> {
        match self.policy.rotate {
            Some(rotate) => self.rotate(path, rotate),
            None => self.delete(path),
        }
    }

    /// Shift retained generations and move `path` into the start slot
    pub fn rotate(&mut self, path: &Path, rotate: u32) -> Result<()> {
        let policy = self.policy;
        let start = policy.start;
        let naming = &policy.naming;

        if start < rotate {
            self.fire(ScriptKind::PreRotate)?;
        }

        for generation in (start.saturating_add(1)..=rotate).rev() {
            self.shift(path, generation - 1, generation)?;
        }

        let slot = naming.slot(path, start);
        let compressed = naming.compressed(&slot);
        let occupant = compressed
            .iter()
            .find(|c| lexists(c))
            .cloned()
            .or_else(|| lexists(&slot).then(|| slot.clone()));
        if let Some(occupant) = occupant {
            self.announce(format!("overwriting {} by {}", occupant.display(), path.display()));
            if let Some(stale) = compressed.filter(|c| lexists(c)) {
                self.remove(&stale)?;
            }
        }

        self.announce(format!("renaming {} -> {}", path.display(), slot.display()));
        self.rename(path, &slot)?;

        let rotated = if self.policy.compression.is_some() {
            self.compress(&slot)?;
            append_suffix(&slot, self.extension())
        } else {
            slot
        };
        self.stamp(&rotated)?;

        self.metrics.record_rotation();
        self.fire(ScriptKind::PostRotate)?;
        Ok(())
    }

    /// Remove `path` for entries that keep no generations
    pub fn delete(&mut self, path: &Path) -> Result<()> {
        self.fire(ScriptKind::PreRemove)?;
        self.announce(format!("deleting {}", path.display()));
        self.remove(path)?;
        self.metrics.record_deletion();
        Ok(())
    }

    /// Create an empty primary when the entry declares `create`
    pub fn create(&mut self, path: &Path) -> Result<()> {
        if !self.policy.create {
            return Ok(());
        }
        if lexists(path) {
            tracing::info!("{} exists, not creating", path.display());
            return Ok(());
        }

        self.announce(format!("creating {}", path.display()));
        if !self.config.dry_run {
            fs::File::create(path).map_err(|e| EngineError::io("create", path, e))?;
        }
        self.metrics.record_creation();
        Ok(())
    }

    fn shift(&mut self, path: &Path, prior: u32, current: u32) -> Result<()> {
        let policy = self.policy;
        let naming = &policy.naming;
        let prior_slot = naming.slot(path, prior);
        let current_slot = naming.slot(path, current);

        if let Some(prior_compressed) = naming.compressed(&prior_slot).filter(|c| lexists(c)) {
            self.clear_slot(&current_slot)?;
            match self.config.shift_strategy {
                ShiftStrategy::Rename => {
                    let target = append_suffix(&current_slot, self.extension());
                    self.announce(format!(
                        "back-renaming {} -> {}",
                        prior_compressed.display(),
                        target.display()
                    ));
                    self.rename(&prior_compressed, &target)?;
                }
                ShiftStrategy::Recompress => {
                    self.recompress(path, &prior_compressed, &current_slot)?;
                }
            }
        } else if lexists(&prior_slot) {
            self.clear_slot(&current_slot)?;
            self.announce(format!(
                "back-renaming {} -> {}",
                prior_slot.display(),
                current_slot.display()
            ));
            self.rename(&prior_slot, &current_slot)?;
            if self.policy.compression.is_some() {
                self.compress(&current_slot)?;
            }
        } else {
            tracing::debug!("no generation {} of {}", prior, path.display());
        }
        Ok(())
    }

    fn recompress(&mut self, path: &Path, artifact: &Path, target: &Path) -> Result<()> {
        let work_dir = self.work_dir(path);
        self.announce(format!("de-compressing {}", artifact.display()));

        if !self.config.dry_run {
            let spec = self.spec()?;
            let extracted = self
                .archiver
                .extract(artifact, spec, &work_dir)
                .map_err(|e| EngineError::Archive(format!("{}: {}", artifact.display(), e)))?;
            let file = extracted.into_iter().next().ok_or_else(|| {
                EngineError::Archive(format!("nothing extracted from {}", artifact.display()))
            })?;
            move_file(&file, target).map_err(|e| EngineError::io("move", &file, e))?;
        }

        self.announce(format!("back-renaming {} -> {}", artifact.display(), target.display()));
        self.remove(artifact)?;
        self.compress(target)
    }

    fn compress(&mut self, slot: &Path) -> Result<()> {
        let work_dir = self.work_dir(slot);
        let target = append_suffix(slot, self.extension());
        self.announce(format!("compressing {} to {}", slot.display(), target.display()));

        if !self.config.dry_run {
            let spec = self.spec()?;
            self.archiver
                .archive(slot, spec, &work_dir)
                .map_err(|e| EngineError::Archive(format!("{}: {}", slot.display(), e)))?;
        }
        self.metrics.record_compression();
        Ok(())
    }

    /// Drop whatever occupies a slot before something is moved into it
    fn clear_slot(&mut self, slot: &Path) -> Result<()> {
        let compressed = self.policy.naming.compressed(slot);
        for occupant in std::iter::once(slot.to_path_buf()).chain(compressed) {
            if lexists(&occupant) {
                tracing::debug!("dropping expired generation {}", occupant.display());
                self.remove(&occupant)?;
            }
        }
        Ok(())
    }

    fn fire(&mut self, kind: ScriptKind) -> Result<()> {
        let commands = self.policy.script(kind);
        if self.scripts.fire(self.runner, kind, commands, self.config.dry_run)? {
            self.metrics.record_script(kind);
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if self.config.dry_run {
            return Ok(());
        }
        fs::rename(from, to).map_err(|e| EngineError::io("rename", from, e))
    }

    /// Mark `path` as rotated now; a rename keeps the primary's old mtime
    fn stamp(&self, path: &Path) -> Result<()> {
        // A dangling link has no target to touch
        if self.config.dry_run || !path.exists() {
            return Ok(());
        }
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(SystemTime::now()))
            .map_err(|e| EngineError::io("touch", path, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if self.config.dry_run {
            return Ok(());
        }
        fs::remove_file(path).map_err(|e| EngineError::io("delete", path, e))
    }

    fn announce(&self, message: String) {
        if self.config.dry_run {
            tracing::info!("DRY RUN: {}", message);
        } else {
            tracing::info!("{}", message);
        }
    }

    fn work_dir(&self, path: &Path) -> PathBuf {
        match &self.policy.scratchdir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    fn extension(&self) -> &str {
        self.policy.naming.extension().unwrap_or_default()
    }

    fn spec(&self) -> Result<&'a CompressionSpec> {
        let policy: &'a EntryPolicy = self.policy;
        policy
            .compression
            .as_ref()
            .ok_or_else(|| EngineError::Config("compression is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrotor_config::parse_config;

    /// Archiver that renames instead of packing, so contents stay readable
    #[derive(Default)]
    struct RenamingArchiver {
        archived: Vec<PathBuf>,
        extracted: Vec<PathBuf>,
    }

    impl Archiver for RenamingArchiver {
        type Error = std::io::Error;

        fn archive(
            &mut self,
            file: &Path,
            spec: &CompressionSpec,
            _work_dir: &Path,
        ) -> std::result::Result<PathBuf, Self::Error> {
            let artifact = append_suffix(file, spec.extension());
            fs::rename(file, &artifact)?;
            self.archived.push(file.to_path_buf());
            Ok(artifact)
        }

        fn extract(
            &mut self,
            artifact: &Path,
            spec: &CompressionSpec,
            work_dir: &Path,
        ) -> std::result::Result<Vec<PathBuf>, Self::Error> {
            let name = artifact.file_name().unwrap().to_str().unwrap();
            let member = work_dir.join(name.strip_suffix(spec.extension()).unwrap());
            fs::copy(artifact, &member)?;
            self.extracted.push(artifact.to_path_buf());
            Ok(vec![member])
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<ScriptKind>,
    }

    impl ScriptRunner for Recorder {
        type Error = String;

        fn run(&mut self, kind: ScriptKind, _commands: &[String]) -> std::result::Result<(), Self::Error> {
            self.calls.push(kind);
            Ok(())
        }
    }

    fn policy_for(path: &Path, body: &str) -> EntryPolicy {
        let text = format!("{} {{\n{}\n}}\n", path.display(), body);
        let entries = parse_config(&text).unwrap();
        EntryPolicy::resolve(&entries[0]).unwrap()
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_rotate_shifts_generations() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current").unwrap();
        fs::write(dir.path().join("app.log.1"), "one").unwrap();
        fs::write(dir.path().join("app.log.2"), "two").unwrap();
        fs::write(dir.path().join("app.log.3"), "three").unwrap();

        let policy = policy_for(&log, "rotate 3\nprerotate\necho pre\nendscript\npostrotate\necho post\nendscript");
        let config = EngineConfig::default();
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics)
            .apply(&log)
            .unwrap();

        assert!(!log.exists());
        assert_eq!(read(dir.path().join("app.log.1")), "current");
        assert_eq!(read(dir.path().join("app.log.2")), "one");
        assert_eq!(read(dir.path().join("app.log.3")), "two");
        assert_eq!(runner.calls, vec![ScriptKind::PreRotate, ScriptKind::PostRotate]);
        assert_eq!(metrics.rotated, 1);
    }

    #[test]
    fn test_rotate_compressed_by_rename() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current").unwrap();
        fs::write(dir.path().join("app.log.1.tar.gz"), "one").unwrap();

        let policy = policy_for(&log, "rotate 2\ncompress");
        let config = EngineConfig::default();
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics)
            .apply(&log)
            .unwrap();

        assert_eq!(read(dir.path().join("app.log.1.tar.gz")), "current");
        assert_eq!(read(dir.path().join("app.log.2.tar.gz")), "one");
        assert!(!dir.path().join("app.log.1").exists());
        assert_eq!(archiver.archived, vec![dir.path().join("app.log.1")]);
        assert!(archiver.extracted.is_empty());
    }

    #[test]
    fn test_rotate_compressed_by_recompress() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current").unwrap();
        fs::write(dir.path().join("app.log.1.tar.gz"), "one").unwrap();

        let body = format!("rotate 2\ncompress\nscratchdir {}", scratch.path().display());
        let policy = policy_for(&log, &body);
        let config = EngineConfig {
            shift_strategy: ShiftStrategy::Recompress,
            ..Default::default()
        };
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics)
            .apply(&log)
            .unwrap();

        assert_eq!(archiver.extracted, vec![dir.path().join("app.log.1.tar.gz")]);
        assert_eq!(read(dir.path().join("app.log.2.tar.gz")), "one");
        assert_eq!(read(dir.path().join("app.log.1.tar.gz")), "current");
        assert_eq!(metrics.compressed, 2);
    }

    #[test]
    fn test_overwrite_of_start_slot() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current").unwrap();
        fs::write(dir.path().join("app.log.1.tar.gz"), "stale").unwrap();

        let policy = policy_for(&log, "rotate 1\ncompress");
        let config = EngineConfig::default();
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics)
            .apply(&log)
            .unwrap();

        assert_eq!(read(dir.path().join("app.log.1.tar.gz")), "current");
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_delete_fires_preremove() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "bye").unwrap();

        let policy = policy_for(&log, "preremove\necho gone\nendscript\ncreate");
        let config = EngineConfig::default();
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        let mut rotator = Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics);
        rotator.apply(&log).unwrap();
        assert!(!log.exists());
        rotator.create(&log).unwrap();
        assert_eq!(read(log.clone()), "");
        rotator.create(&log).unwrap();

        assert_eq!(runner.calls, vec![ScriptKind::PreRemove]);
        assert_eq!(metrics.deleted, 1);
        assert_eq!(metrics.created, 1);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current").unwrap();
        fs::write(dir.path().join("app.log.1"), "one").unwrap();

        let policy = policy_for(&log, "rotate 2\ncompress\ncreate\npostrotate\necho post\nendscript");
        let config = EngineConfig::preview();
        let (mut archiver, mut runner, mut metrics) =
            (RenamingArchiver::default(), Recorder::default(), RotationMetrics::new());

        let mut rotator = Rotator::new(&policy, &config, &mut archiver, &mut runner, &mut metrics);
        rotator.apply(&log).unwrap();
        rotator.create(&log).unwrap();

        assert_eq!(read(log.clone()), "current");
        assert_eq!(read(dir.path().join("app.log.1")), "one");
        assert!(!dir.path().join("app.log.2").exists());
        assert!(archiver.archived.is_empty());
        assert!(runner.calls.is_empty());
    }
}
