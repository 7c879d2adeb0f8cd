//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use logrotor_engine::{EngineConfig, RotationEngine, RotationWorker};

/// Execute the watch command.
pub async fn execute_watch(args: WatchArgs, mut config: EngineConfig, formatter: &Formatter) -> Result<()> {
    if let Some(minutes) = args.interval {
        config.interval_minutes = minutes;
    }
    config.validate().map_err(CliError::Config)?;

    // Fail fast on a broken file; later cycles log errors and carry on
    logrotor_config::load(&args.conf)?;

    eprintln!(
        "{}",
        formatter.info(&format!(
            "Rotating {} every {} minute(s), Ctrl+C to stop",
            args.conf.display(),
            config.interval_minutes
        ))
    );

    let interval = config.interval();
    tracing::debug!("watch interval {:?}", interval);
    let engine = RotationEngine::system(config);
    let mut worker = RotationWorker::new(engine, &args.conf, interval);
    worker.run().await?;

    println!("{}", formatter.format_metrics(&worker.metrics())?);
    Ok(())
}
