//! List command implementation.

use crate::cli::ListArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::ModelSession;
use sysmod_domain::ObjectKind;

/// Execute the list command.
pub fn execute_list(args: ListArgs, session: &ModelSession, formatter: &Formatter) -> Result<()> {
    let kind = args.kind.as_deref().map(parse_kind).transpose()?;
    println!("{}", formatter.format_objects(session.model(), kind)?);
    Ok(())
}

/// Parse an object kind as typed by the user ("functions", "functional element").
pub fn parse_kind(word: &str) -> Result<ObjectKind> {
    ObjectKind::parse(word.trim())
        .ok_or_else(|| CliError::InvalidInput(format!("Unknown object kind: {}", word)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("functions").unwrap(), ObjectKind::Function);
        assert!(matches!(
            parse_kind("widgets").unwrap_err(),
            CliError::InvalidInput(_)
        ));
    }
}
