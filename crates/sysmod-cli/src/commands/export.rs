//! Export command implementation.

use crate::cli::ExportArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use sysmod_store::export_csv_file;

/// Execute the export command.
pub fn execute_export(args: ExportArgs, session: &ModelSession, formatter: &Formatter) -> Result<()> {
    let count = export_csv_file(session.model(), &args.file)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Exported {} object(s) to {}",
            count,
            args.file.display()
        ))
    );
    Ok(())
}
