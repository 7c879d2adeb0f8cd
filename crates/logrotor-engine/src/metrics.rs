//! Metrics collection for rotation runs

use logrotor_domain::ScriptKind;
use std::collections::HashMap;

/// Counters accumulated across rotation runs
#[derive(Debug, Clone, Default)]
pub struct RotationMetrics {
    /// Files rotated into a generation slot
    pub rotated: usize,

    /// Files deleted by entries without retention
    pub deleted: usize,

    /// Empty primaries created after rotation
    pub created: usize,

    /// Artifacts compressed
    pub compressed: usize,

    /// Files left alone because a criterion judged them not eligible
    pub skipped: usize,

    /// Files recognized as rotated generations and ignored
    pub artifacts_ignored: usize,

    /// Declared paths that did not exist
    pub missing: usize,

    /// Directories skipped because recursion was not enabled
    pub directories_skipped: usize,

    /// Scripts fired per kind
    pub scripts: HashMap<ScriptKind, usize>,

    /// Completed runs
    pub run_count: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl RotationMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rotation
    pub fn record_rotation(&mut self) {
        self.rotated += 1;
    }

    /// Record a deletion
    pub fn record_deletion(&mut self) {
        self.deleted += 1;
    }

    /// Record a created primary
    pub fn record_creation(&mut self) {
        self.created += 1;
    }

    /// Record a compressed artifact
    pub fn record_compression(&mut self) {
        self.compressed += 1;
    }

    /// Record a file skipped by its criteria
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Record an ignored artifact
    pub fn record_artifact_ignored(&mut self) {
        self.artifacts_ignored += 1;
    }

    /// Record a missing path
    pub fn record_missing(&mut self) {
        self.missing += 1;
    }

    /// Record a directory skipped without recursion
    pub fn record_directory_skipped(&mut self) {
        self.directories_skipped += 1;
    }

    /// Record a fired script
    pub fn record_script(&mut self, kind: ScriptKind) {
        *self.scripts.entry(kind).or_insert(0) += 1;
    }

    /// Record a completed run
    pub fn record_run(&mut self, runtime_ms: u64) {
        self.run_count += 1;
        self.total_runtime_ms += runtime_ms;
    }

    /// Total scripts fired across all kinds
    pub fn total_scripts(&self) -> usize {
        self.scripts.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Rotation Summary".to_string(),
            "================".to_string(),
            format!("Runs: {}", self.run_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
            format!("Rotated: {}", self.rotated),
            format!("Deleted: {}", self.deleted),
            format!("Created: {}", self.created),
            format!("Compressed: {}", self.compressed),
            format!("Skipped by criteria: {}", self.skipped),
            format!("Artifacts ignored: {}", self.artifacts_ignored),
            format!("Missing paths: {}", self.missing),
            format!("Directories skipped: {}", self.directories_skipped),
        ];

        if !self.scripts.is_empty() {
            lines.push(String::new());
            lines.push("Scripts fired:".to_string());
            for kind in ScriptKind::ALL {
                if let Some(count) = self.scripts.get(&kind) {
                    lines.push(format!("  {}: {}", kind, count));
                }
            }
            lines.push(format!("  Total: {}", self.total_scripts()));
        }

        lines.join("\n")
    }
}
