//! Run command implementation.

use crate::cli::RunArgs;
use crate::error::Result;
use crate::output::Formatter;
use logrotor_engine::{EngineConfig, RotationEngine};

/// Execute the run command.
pub fn execute_run(args: RunArgs, config: EngineConfig, formatter: &Formatter) -> Result<()> {
    let dry_run = config.dry_run;
    tracing::info!("rotating according to {}", args.conf.display());
    let mut engine = RotationEngine::system(config);
    let metrics = engine.run_file(&args.conf)?;

    if dry_run {
        eprintln!("{}", formatter.warning("Dry run: no file was changed"));
    }
    println!("{}", formatter.format_metrics(&metrics)?);

    Ok(())
}
