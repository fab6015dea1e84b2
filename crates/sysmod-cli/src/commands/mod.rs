//! Command implementations.

pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod run;
pub mod show;

pub use self::delete::execute_delete;
pub use self::export::execute_export;
pub use self::import::execute_import;
pub use self::list::execute_list;
pub use self::run::execute_run;
pub use self::show::execute_show;

use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use std::io::{self, Write};
use sysmod_session::Report;

/// Ask a yes/no question on stdin; anything but "y" or "yes" is a no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} ", prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}

/// Print `report`, then keep answering its questions through `ask` and
/// printing what each answer led to.
///
/// Returns 1 if any of the reports changed the model.
pub fn answer_questions<F>(
    session: &mut ModelSession,
    report: Report,
    formatter: &Formatter,
    mut ask: F,
) -> Result<u8>
where
    F: FnMut(&str) -> Result<bool>,
{
    let mut report = report;
    let mut flag = 0;
    loop {
        flag = flag.max(report.flag);
        let output = formatter.format_report(&report)?;
        if !output.is_empty() {
            println!("{}", output);
        }

        let Some(question) = report.question.take() else {
            return Ok(flag);
        };
        let accepted = ask(&question)?;
        report = session.resume(accepted)?;
    }
}
