//! Splitting requirement text into clauses
//!
//! Connectives are fixed: a leading `if … then` / `if …,` gives the condition,
//! a leading `when …,` / `while …,` gives the temporal clause, and the same
//! words may also trail the main clause. The main clause is split on the
//! first modal verb (`shall`, `must`, `should`) into subject and object.

use crate::error::LinkerError;
use crate::types::Clauses;
use regex::Regex;
use std::sync::LazyLock;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static LEADING_IF: Pattern = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*if\s+(.+?)\s*(?:,\s*then\s+|\s+then\s+|,\s*)(.+)$")
});
static LEADING_TEMPORAL: Pattern =
    LazyLock::new(|| Regex::new(r"(?is)^\s*(?:when|while)\s+(.+?)\s*,\s*(.+)$"));
static TRAILING: Pattern = LazyLock::new(|| Regex::new(r"(?is)^(.+?)\s+(if|when|while)\s+(.+)$"));
static MODAL: Pattern =
    LazyLock::new(|| Regex::new(r"(?is)^(.*?)\b(?:shall|must|should)\b\s*(.*)$"));

/// Split a requirement or goal sentence into its clauses
pub fn split_clauses(text: &str) -> Result<Clauses, LinkerError> {
    let leading_if = compiled(&LEADING_IF)?;
    let leading_temporal = compiled(&LEADING_TEMPORAL)?;
    let trailing = compiled(&TRAILING)?;
    let modal = compiled(&MODAL)?;

    let mut clauses = Clauses::default();
    let mut rest = text.trim().trim_end_matches(['.', '!', ';']).trim().to_string();

    loop {
        if clauses.condition.is_none() {
            if let Some(caps) = leading_if.captures(&rest) {
                clauses.condition = Some(caps[1].trim().to_string());
                rest = caps[2].trim().to_string();
                continue;
            }
        }
        if clauses.temporal.is_none() {
            if let Some(caps) = leading_temporal.captures(&rest) {
                clauses.temporal = Some(caps[1].trim().to_string());
                rest = caps[2].trim().to_string();
                continue;
            }
        }
        break;
    }

    if let Some(caps) = trailing.captures(&rest) {
        let clause = caps[3].trim().to_string();
        let slot = match caps[2].to_lowercase().as_str() {
            "if" => &mut clauses.condition,
            _ => &mut clauses.temporal,
        };
        if slot.is_none() {
            *slot = Some(clause);
            rest = caps[1].trim().to_string();
        }
    }

    match modal.captures(&rest) {
        Some(caps) => {
            clauses.subject = caps[1].trim().to_string();
            clauses.object = caps[2].trim().to_string();
        }
        None => clauses.object = rest,
    }

    Ok(clauses)
}

// Patterns are built on first use and shared by every later call
fn compiled(pattern: &'static Pattern) -> Result<&'static Regex, LinkerError> {
    pattern.as_ref().map_err(|e| LinkerError::Config(e.to_string()))
}
