//! Delete command implementation.

use crate::cli::DeleteArgs;
use crate::commands::confirm;
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;

/// Execute the delete command.
///
/// Objects still taking part in a relation are refused and reported; the
/// others are deleted.
pub fn execute_delete(args: DeleteArgs, session: &mut ModelSession, formatter: &Formatter) -> Result<()> {
    // Confirm deletion unless --yes is specified
    if !args.yes {
        println!("About to delete {} object(s):", args.names.len());
        for name in &args.names {
            println!("  - {}", name);
        }
        if !confirm("Continue? [y/N]")? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    let report = session.execute(&format!("delete {}", args.names.join(", ")))?;
    println!("{}", formatter.format_report(&report)?);
    Ok(())
}
