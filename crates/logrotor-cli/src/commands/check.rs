//! Check command implementation.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::Formatter;
use logrotor_engine::EntryPolicy;

/// Execute the check command.
///
/// Parses the configuration and resolves every entry's policy; nothing on
/// disk is touched.
pub fn execute_check(args: CheckArgs, formatter: &Formatter) -> Result<()> {
    let entries = logrotor_config::load(&args.conf)?;
    tracing::debug!("{} entries parsed from {}", entries.len(), args.conf.display());
    let policies = entries
        .iter()
        .map(EntryPolicy::resolve)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    println!("{}", formatter.format_entries(&policies)?);
    eprintln!(
        "{}",
        formatter.success(&format!("{}: {} entries valid", args.conf.display(), policies.len()))
    );

    Ok(())
}
