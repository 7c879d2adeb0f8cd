//! Background worker for scheduled rotation

use crate::{EngineError, RotationEngine, RotationMetrics};
use logrotor_domain::traits::{Archiver, PathWalker, ScriptRunner};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, Duration};

/// Background worker that re-reads a configuration file and runs it on a schedule
///
/// The file is loaded again on every cycle, so edits take effect without a
/// restart. Cycles run on tokio's blocking pool; a shutdown signal arriving
/// mid-cycle is acknowledged at once and the worker stops when the cycle
/// finishes.
///
/// # Examples
///
/// ```no_run
/// use logrotor_engine::{EngineConfig, RotationEngine, RotationWorker};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = RotationEngine::system(EngineConfig::default());
///     let mut worker = RotationWorker::new(engine, "/etc/logrotor.conf", Duration::from_secs(3600));
///
///     // Run for 3 cycles then stop
///     worker.run_cycles(3).await?;
///     Ok(())
/// }
/// ```
pub struct RotationWorker<A, R, W> {
    engine: Arc<Mutex<RotationEngine<A, R, W>>>,
    conf: PathBuf,
    interval: Duration,
}

impl<A, R, W> RotationWorker<A, R, W>
where
    A: Archiver + Send + 'static,
    A::Error: Display,
    R: ScriptRunner + Send + 'static,
    R::Error: Display,
    W: PathWalker + Send + 'static,
    W::Error: Display,
{
    /// Create a worker running `conf` every `interval`
    pub fn new(engine: RotationEngine<A, R, W>, conf: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            conf: conf.into(),
            interval,
        }
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed cycle is logged and the worker keeps going.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is zero.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        self.check_interval()?;
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Rotation worker started for {} (interval: {:?})",
            self.conf.display(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping rotation worker");
                    break;
                }
            }

            tracing::debug!("Starting rotation cycle");
            let mut cycle = self.spawn_cycle();
            let finished = tokio::select! {
                outcome = &mut cycle => Some(outcome),
                _ = tokio::signal::ctrl_c() => None,
            };
            let stop = finished.is_none();
            let outcome = match finished {
                Some(outcome) => outcome,
                None => {
                    tracing::info!("Shutdown signal received, finishing the current cycle");
                    cycle.await
                }
            };

            match flatten(outcome) {
                Ok(metrics) => {
                    tracing::info!(
                        "Cycle completed: {} rotated, {} deleted, {} skipped",
                        metrics.rotated,
                        metrics.deleted,
                        metrics.skipped
                    );
                }
                Err(e) => {
                    tracing::error!("Cycle failed: {}", e);
                }
            }
            if stop {
                break;
            }
        }

        tracing::info!("Rotation worker stopped. Final metrics:\n{}", self.metrics().summary());
        Ok(())
    }

    /// Run a fixed number of cycles
    ///
    /// # Errors
    ///
    /// Returns the first failing cycle's error.
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), EngineError> {
        self.check_interval()?;
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Rotation worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting rotation cycle {}/{}", cycle + 1, cycles);

            match flatten(self.spawn_cycle().await) {
                Ok(metrics) => {
                    tracing::info!(
                        "Cycle {}/{} completed: {} rotated, {} deleted",
                        cycle + 1,
                        cycles,
                        metrics.rotated,
                        metrics.deleted
                    );
                }
                Err(e) => {
                    tracing::error!("Cycle {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Rotation worker finished {} cycles. Final metrics:\n{}",
            cycles,
            self.metrics().summary()
        );
        Ok(())
    }

    /// Snapshot of the metrics accumulated by the engine
    pub fn metrics(&self) -> RotationMetrics {
        self.engine().metrics().clone()
    }

    /// Reset the engine's metrics counters
    pub fn reset_metrics(&mut self) {
        self.engine().reset_metrics();
    }

    fn engine(&self) -> MutexGuard<'_, RotationEngine<A, R, W>> {
        // Poisoned only by a panicking cycle
        self.engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run the configuration once on the blocking pool
    fn spawn_cycle(&self) -> JoinHandle<Result<RotationMetrics, EngineError>> {
        let engine = Arc::clone(&self.engine);
        let conf = self.conf.clone();
        tokio::task::spawn_blocking(move || {
            let mut engine = engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            engine.run_file(&conf)
        })
    }

    fn check_interval(&self) -> Result<(), EngineError> {
        if self.interval.is_zero() {
            return Err(EngineError::Worker("interval must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn flatten(
    outcome: Result<Result<RotationMetrics, EngineError>, JoinError>,
) -> Result<RotationMetrics, EngineError> {
    outcome.map_err(|e| EngineError::Worker(format!("rotation cycle panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, WalkdirWalker};
    use logrotor_domain::{CompressionSpec, ScriptKind};
    use std::fs;
    use std::io::Write;
    use std::path::Path;

    struct NoArchiver;

    impl Archiver for NoArchiver {
        type Error = String;

        fn archive(&mut self, file: &Path, _: &CompressionSpec, _: &Path) -> Result<PathBuf, String> {
            Err(format!("unexpected archive of {}", file.display()))
        }

        fn extract(&mut self, file: &Path, _: &CompressionSpec, _: &Path) -> Result<Vec<PathBuf>, String> {
            Err(format!("unexpected extract of {}", file.display()))
        }
    }

    #[derive(Default)]
    struct CountingRunner {
        runs: usize,
    }

    impl ScriptRunner for CountingRunner {
        type Error = String;

        fn run(&mut self, _: ScriptKind, _: &[String]) -> Result<(), String> {
            self.runs += 1;
            Ok(())
        }
    }

    fn engine() -> RotationEngine<NoArchiver, CountingRunner, WalkdirWalker> {
        RotationEngine::new(
            EngineConfig::default(),
            NoArchiver,
            CountingRunner::default(),
            WalkdirWalker::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_rotates_each_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        let conf = dir.path().join("logrotor.conf");
        let mut file = fs::File::create(&conf).unwrap();
        writeln!(file, "{} {{\n    rotate 3\n    create\n}}", log.display()).unwrap();
        fs::write(&log, "first").unwrap();

        let mut worker = RotationWorker::new(engine(), &conf, Duration::from_secs(60));
        worker.run_cycles(2).await.unwrap();

        assert_eq!(worker.metrics().run_count, 2);
        assert_eq!(worker.metrics().rotated, 2);
        assert_eq!(fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "");
        assert!(log.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_returns_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = RotationWorker::new(engine(), dir.path().join("missing.conf"), Duration::from_secs(60));

        let err = worker.run_cycles(3).await.unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
        assert_eq!(worker.metrics().run_count, 0);
    }

    /// Records the thread each script ran on
    #[derive(Clone, Default)]
    struct ThreadRecorder {
        threads: Arc<Mutex<Vec<std::thread::ThreadId>>>,
    }

    impl ScriptRunner for ThreadRecorder {
        type Error = String;

        fn run(&mut self, _: ScriptKind, _: &[String]) -> Result<(), String> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cycles_run_off_the_runtime_thread() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        let conf = dir.path().join("logrotor.conf");
        fs::write(
            &conf,
            format!("{} {{\n    rotate 1\n    postrotate\n        true\n    endscript\n}}\n", log.display()),
        )
        .unwrap();
        fs::write(&log, "x").unwrap();

        let recorder = ThreadRecorder::default();
        let engine = RotationEngine::new(
            EngineConfig::default(),
            NoArchiver,
            recorder.clone(),
            WalkdirWalker::new(),
        );
        let mut worker = RotationWorker::new(engine, &conf, Duration::from_millis(1));
        worker.run_cycles(1).await.unwrap();

        let threads = recorder.threads.lock().unwrap();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
        assert_eq!(worker.metrics().rotated, 1);
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let mut worker = RotationWorker::new(engine(), "/nonexistent.conf", Duration::ZERO);
        assert!(matches!(worker.run_cycles(1).await, Err(EngineError::Worker(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("logrotor.conf");
        fs::write(&conf, "").unwrap();

        let mut worker = RotationWorker::new(engine(), &conf, Duration::from_secs(60));
        worker.run_cycles(1).await.unwrap();
        assert_eq!(worker.metrics().run_count, 1);

        worker.reset_metrics();
        assert_eq!(worker.metrics().run_count, 0);
    }
}
