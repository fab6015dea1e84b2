//! Show command implementation.

use crate::cli::ShowArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use std::fs;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, session: &ModelSession, formatter: &Formatter) -> Result<()> {
    let diagram = session.show(&args.name)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &diagram)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote diagram of {} to {}", args.name, path.display()))
            );
        }
        None => println!("{}", diagram),
    }
    Ok(())
}
