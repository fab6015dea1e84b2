//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use sysmod_store::import_csv_file;

/// Execute the import command.
pub fn execute_import(args: ImportArgs, session: &mut ModelSession, formatter: &Formatter) -> Result<()> {
    let mut skipped = 0;
    let imported = session.import(|ctx| {
        import_csv_file(ctx, &args.file).map(|report| {
            skipped = report.skipped.len();
            report.imported
        })
    })?;

    println!(
        "{}",
        formatter.success(&format!("Imported {} object(s)", imported.len()))
    );
    if skipped > 0 {
        println!(
            "{}",
            formatter.warning(&format!("Skipped {} object(s) already in the model", skipped))
        );
    }
    Ok(())
}
