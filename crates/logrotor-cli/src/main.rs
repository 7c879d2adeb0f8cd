//! Logrotor - rotate, compress and expire log files.

use clap::Parser;
use logrotor_cli::cli::RunArgs;
use logrotor_cli::commands;
use logrotor_cli::{logging, Cli, CliError, Command, Formatter, Settings};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> logrotor_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let settings = Settings::load(cli.settings.as_deref())?;
    logging::init(&logging::resolve_level(&cli, &settings))?;

    // Engine settings, with command-line overrides
    let mut engine_config = settings.engine.clone();
    if cli.dry_run {
        engine_config.dry_run = true;
    }
    engine_config.validate().map_err(CliError::Config)?;
    tracing::debug!("engine settings: {:?}", engine_config);

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && settings.color;

    let formatter = Formatter::new(format, color_enabled);

    if let (Some(conf), Some(_)) = (&cli.conf, &cli.command) {
        return Err(CliError::InvalidInput(format!(
            "unexpected configuration file {} before a subcommand",
            conf.display()
        )));
    }

    match cli.command {
        Some(Command::Run(args)) => {
            commands::execute_run(args, engine_config, &formatter)?;
        }
        Some(Command::Check(args)) => {
            commands::execute_check(args, &formatter)?;
        }
        Some(Command::Watch(args)) => {
            commands::execute_watch(args, engine_config, &formatter).await?;
        }
        None => {
            let conf = cli.conf.ok_or_else(|| {
                CliError::InvalidInput("no configuration file given (try 'logrotor --help')".to_string())
            })?;
            commands::execute_run(RunArgs { conf }, engine_config, &formatter)?;
        }
    }

    Ok(())
}
