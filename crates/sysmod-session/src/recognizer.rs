//! Command recognizer
//!
//! Turns a block of quasi-English lines into [`Command`]s. Patterns are grouped
//! in families tried in a fixed order; within a family the first pattern that
//! matches a line wins and the line is consumed, so later families never see it.
//! Commands come out grouped by family, which means every declaration in a
//! block is applied before any relation that refers to it.

use crate::{Result, SessionError};
use regex::{Captures, Regex};
use sysmod_domain::{FlowRole, ObjectKind};
use tracing::debug;

/// A recognized command, with names still unresolved
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `requirement: <text>` / `goal: <text>`
    Statement {
        /// Requirement or Goal
        kind: ObjectKind,
        /// Free text
        text: String,
    },
    /// `X describes "<text>"`
    Describe {
        /// Statement name
        name: String,
        /// Free text
        text: String,
    },
    /// `the alias of X is Y`
    Alias {
        /// Object name
        name: String,
        /// New alias
        alias: String,
    },
    /// `the <attribute> of X is <value>`
    AttributeValue {
        /// Attribute name
        attribute: String,
        /// Described object
        object: String,
        /// Value
        value: String,
    },
    /// `T goes from S1 to S2`
    TransitionEndpoints {
        /// Transition name
        transition: String,
        /// Source state
        source: String,
        /// Destination state
        destination: String,
    },
    /// `condition for T is <text>`
    Condition {
        /// Transition name
        transition: String,
        /// Condition text
        text: String,
    },
    /// `X extends <kind or type>`
    DeclareType {
        /// New type name
        name: String,
        /// Kind word or type name it extends
        base: String,
    },
    /// `X is a <kind or type>`, `X, Y and Z are <kinds>`
    Declare {
        /// Names to declare
        names: Vec<String>,
        /// Kind word or type name
        kind: String,
    },
    /// `X is composed of A, B` / `X is not composed of A`
    Compose {
        /// Parent name
        parent: String,
        /// Child names
        children: Vec<String>,
        /// Detach instead of attach
        remove: bool,
    },
    /// `F produces A`, `F consumes A` and their negations
    Flow {
        /// Function name
        function: String,
        /// Producer or consumer side
        role: FlowRole,
        /// Data names
        data: Vec<String>,
        /// Retract instead of record
        remove: bool,
    },
    /// `H allocates A, B` / `H does not allocate A`
    Allocate {
        /// Holder name
        holder: String,
        /// Allocated object names
        items: Vec<String>,
        /// Deallocate instead
        remove: bool,
    },
    /// `A, B satisfy R`
    Satisfy {
        /// Satisfying object names
        items: Vec<String>,
        /// Requirement or goal name
        statement: String,
    },
    /// `E exposes I` / `E does not expose I`
    Expose {
        /// Element name
        element: String,
        /// Interface names
        interfaces: Vec<String>,
        /// Unexpose instead
        remove: bool,
    },
    /// `A is derived from B`; `A is not derived` when `base` is None
    Derive {
        /// Derived object name
        name: String,
        /// Base object name
        base: Option<String>,
    },
    /// `A precedes B`
    Precede {
        /// Data that comes first
        predecessor: String,
        /// Data that comes after
        data: String,
    },
    /// `consider V`
    Consider {
        /// View name
        view: String,
    },
    /// `delete A, B`
    Delete {
        /// Names of the objects to delete
        names: Vec<String>,
    },
    /// `show X`
    Show {
        /// Object name
        name: String,
    },
}

/// Pattern families, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Requirement or goal text
    Statement,
    /// Quoted description of a named statement
    Describe,
    /// Alternative name
    Alias,
    /// Attribute value
    AttributeValue,
    /// Transition endpoints and conditions
    Transition,
    /// User-defined type
    DeclareType,
    /// Object declaration
    Declare,
    /// Composition
    Compose,
    /// Production and consumption
    Flow,
    /// Allocation
    Allocate,
    /// Requirement satisfaction
    Satisfy,
    /// Interface exposure
    Expose,
    /// Derivation
    Derive,
    /// Data ordering
    Precede,
    /// View activation
    View,
    /// Safe delete
    Delete,
    /// Diagram
    Show,
}

impl Family {
    /// Every family, in matching order
    pub const ALL: [Family; 17] = [
        Family::Statement,
        Family::Describe,
        Family::Alias,
        Family::AttributeValue,
        Family::Transition,
        Family::DeclareType,
        Family::Declare,
        Family::Compose,
        Family::Flow,
        Family::Allocate,
        Family::Satisfy,
        Family::Expose,
        Family::Derive,
        Family::Precede,
        Family::View,
        Family::Delete,
        Family::Show,
    ];

    fn patterns(self) -> &'static [&'static str] {
        match self {
            Family::Statement => &[r"^(?P<kind>requirement|goal)\s*:\s*(?P<text>.+)$"],
            Family::Describe => &[r#"^(?P<name>.+?)\s+describes\s+"(?P<text>.*)"$"#],
            Family::Alias => &[r"^the\s+alias\s+of\s+(?P<name>.+?)\s+is\s+(?P<alias>.+)$"],
            Family::AttributeValue => {
                &[r"^the\s+(?P<attribute>.+?)\s+of\s+(?P<object>.+?)\s+is\s+(?P<value>.+)$"]
            }
            Family::Transition => &[
                r"^(?P<transition>.+?)\s+goes\s+from\s+(?P<source>.+?)\s+to\s+(?P<destination>.+)$",
                r"^condition\s+for\s+(?P<transition>.+?)\s+is\s+(?P<text>.+)$",
            ],
            Family::DeclareType => &[r"^(?P<name>.+?)\s+extends\s+(?P<base>.+)$"],
            Family::Declare => &[
                r"^(?P<names>.+?)\s+is\s+an?\s+(?P<kind>.+)$",
                r"^(?P<names>.+?)\s+are\s+(?P<kind>.+)$",
            ],
            Family::Compose => &[
                r"^(?P<parent>.+?)\s+is\s+not\s+composed\s+of\s+(?P<children>.+)$",
                r"^(?P<parent>.+?)\s+is\s+composed\s+of\s+(?P<children>.+)$",
            ],
            Family::Flow => &[
                r"^(?P<function>.+?)\s+does\s+not\s+(?P<verb>produce|consume)\s+(?P<data>.+)$",
                r"^(?P<function>.+?)\s+(?P<verb>produces|consumes)\s+(?P<data>.+)$",
            ],
            Family::Allocate => &[
                r"^(?P<holder>.+?)\s+does\s+not\s+allocate\s+(?P<items>.+)$",
                r"^(?P<holder>.+?)\s+allocates\s+(?P<items>.+)$",
            ],
            Family::Satisfy => &[r"^(?P<items>.+?)\s+satisf(?:y|ies)\s+(?P<statement>.+)$"],
            Family::Expose => &[
                r"^(?P<element>.+?)\s+does\s+not\s+expose\s+(?P<interfaces>.+)$",
                r"^(?P<element>.+?)\s+exposes\s+(?P<interfaces>.+)$",
            ],
            Family::Derive => &[
                r"^(?P<name>.+?)\s+is\s+not\s+derived(?:\s+from\s+.+)?$",
                r"^(?P<name>.+?)\s+is\s+derived\s+from\s+(?P<base>.+)$",
            ],
            Family::Precede => &[r"^(?P<predecessor>.+?)\s+precedes\s+(?P<data>.+)$"],
            Family::View => &[r"^consider\s+(?P<view>.+)$"],
            Family::Delete => &[r"^delete\s+(?P<names>.+)$"],
            Family::Show => &[r"^show\s+(?P<name>.+)$"],
        }
    }

    /// Build the command for the `index`-th pattern of this family
    fn build(self, index: usize, caps: &Captures) -> Option<Command> {
        let get = |name: &str| caps.name(name).map(|m| m.as_str().trim().to_string());
        let list = |name: &str| caps.name(name).map(|m| split_list(m.as_str()));
        // The negated form is always listed first
        let negated = index == 0;

        let command = match self {
            Family::Statement => Command::Statement {
                kind: ObjectKind::parse(&get("kind")?)?,
                text: get("text")?,
            },
            Family::Describe => Command::Describe {
                name: get("name")?,
                text: get("text")?,
            },
            Family::Alias => Command::Alias {
                name: get("name")?,
                alias: get("alias")?,
            },
            Family::AttributeValue => Command::AttributeValue {
                attribute: get("attribute")?,
                object: get("object")?,
                value: get("value")?,
            },
            Family::Transition if index == 0 => Command::TransitionEndpoints {
                transition: get("transition")?,
                source: get("source")?,
                destination: get("destination")?,
            },
            Family::Transition => Command::Condition {
                transition: get("transition")?,
                text: get("text")?,
            },
            Family::DeclareType => Command::DeclareType {
                name: get("name")?,
                base: get("base")?,
            },
            Family::Declare => Command::Declare {
                names: list("names")?,
                kind: get("kind")?,
            },
            Family::Compose => Command::Compose {
                parent: get("parent")?,
                children: list("children")?,
                remove: negated,
            },
            Family::Flow => Command::Flow {
                function: get("function")?,
                role: if get("verb")?.to_lowercase().starts_with("produce") {
                    FlowRole::Producer
                } else {
                    FlowRole::Consumer
                },
                data: list("data")?,
                remove: negated,
            },
            Family::Allocate => Command::Allocate {
                holder: get("holder")?,
                items: list("items")?,
                remove: negated,
            },
            Family::Satisfy => Command::Satisfy {
                items: list("items")?,
                statement: get("statement")?,
            },
            Family::Expose => Command::Expose {
                element: get("element")?,
                interfaces: list("interfaces")?,
                remove: negated,
            },
            Family::Derive => Command::Derive {
                name: get("name")?,
                base: if negated { None } else { Some(get("base")?) },
            },
            Family::Precede => Command::Precede {
                predecessor: get("predecessor")?,
                data: get("data")?,
            },
            Family::View => Command::Consider { view: get("view")? },
            Family::Delete => Command::Delete {
                names: list("names")?,
            },
            Family::Show => Command::Show { name: get("name")? },
        };
        Some(command)
    }
}

/// What a block turned into
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognized {
    /// Commands in family order
    pub commands: Vec<Command>,
    /// Lines no family matched
    pub unrecognized: Vec<String>,
}

/// Compiled pattern table
pub struct Recognizer {
    table: Vec<(Family, Vec<Regex>)>,
}

impl Recognizer {
    /// Compile every family's patterns
    pub fn new() -> Result<Self> {
        let mut table = Vec::with_capacity(Family::ALL.len());
        for family in Family::ALL {
            let patterns = family
                .patterns()
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| SessionError::Config(e.to_string()))?;
            table.push((family, patterns));
        }
        Ok(Self { table })
    }

    /// Recognize every line of `block`
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn recognize(&self, block: &str) -> Recognized {
        let mut lines: Vec<Option<&str>> = block
            .lines()
            .map(|l| l.trim().trim_end_matches('.').trim_end())
            .map(|l| (!l.is_empty() && !l.starts_with('#')).then_some(l))
            .collect();

        let mut recognized = Recognized::default();
        for (family, patterns) in &self.table {
            for slot in lines.iter_mut() {
                let Some(line) = *slot else { continue };
                let built = patterns.iter().enumerate().find_map(|(index, re)| {
                    re.captures(line).map(|caps| family.build(index, &caps))
                });
                if let Some(command) = built {
                    debug!("{:?} matched '{}'", family, line);
                    if let Some(command) = command {
                        recognized.commands.push(command);
                    }
                    *slot = None;
                }
            }
        }

        recognized.unrecognized = lines.into_iter().flatten().map(str::to_string).collect();
        recognized
    }
}

/// Split "A, B and C" into its names
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|s| s.trim())
        .map(|s| s.strip_prefix("and ").unwrap_or(s).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &str) -> Command {
        let recognized = Recognizer::new().unwrap().recognize(line);
        assert!(recognized.unrecognized.is_empty(), "{:?}", recognized);
        assert_eq!(recognized.commands.len(), 1, "{:?}", recognized);
        recognized.commands.into_iter().next().unwrap()
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("A, B and C"), vec!["A", "B", "C"]);
        assert_eq!(split_list("A, B, and C"), vec!["A", "B", "C"]);
        assert_eq!(split_list("fuel pump"), vec!["fuel pump"]);
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            one("F1 is a function."),
            Command::Declare {
                names: vec!["F1".into()],
                kind: "function".into()
            }
        );
        assert_eq!(
            one("F1, F1a and F2 are functions"),
            Command::Declare {
                names: vec!["F1".into(), "F1a".into(), "F2".into()],
                kind: "functions".into()
            }
        );
        assert_eq!(
            one("Pump extends functional element"),
            Command::DeclareType {
                name: "Pump".into(),
                base: "functional element".into()
            }
        );
    }

    #[test]
    fn test_negated_forms() {
        assert_eq!(
            one("F1 is not composed of F1a"),
            Command::Compose {
                parent: "F1".into(),
                children: vec!["F1a".into()],
                remove: true
            }
        );
        assert_eq!(
            one("F2 does not consume a"),
            Command::Flow {
                function: "F2".into(),
                role: FlowRole::Consumer,
                data: vec!["a".into()],
                remove: true
            }
        );
        assert_eq!(
            one("E does not allocate F1"),
            Command::Allocate {
                holder: "E".into(),
                items: vec!["F1".into()],
                remove: true
            }
        );
        assert_eq!(
            one("P1 is not derived"),
            Command::Derive {
                name: "P1".into(),
                base: None
            }
        );
    }

    #[test]
    fn test_statement_text_is_not_read_as_declaration() {
        assert_eq!(
            one("requirement: The pump is a critical part"),
            Command::Statement {
                kind: ObjectKind::Requirement,
                text: "The pump is a critical part".into()
            }
        );
        assert_eq!(
            one(r#"R7 describes "The valve is a spare""#),
            Command::Describe {
                name: "R7".into(),
                text: "The valve is a spare".into()
            }
        );
    }

    #[test]
    fn test_alias_wins_over_attribute_value() {
        assert_eq!(
            one("the alias of F1 is main"),
            Command::Alias {
                name: "F1".into(),
                alias: "main".into()
            }
        );
        assert_eq!(
            one("the mass of pump is 4 kg"),
            Command::AttributeValue {
                attribute: "mass".into(),
                object: "pump".into(),
                value: "4 kg".into()
            }
        );
    }

    #[test]
    fn test_transition_forms() {
        assert_eq!(
            one("T1 goes from Idle to Running"),
            Command::TransitionEndpoints {
                transition: "T1".into(),
                source: "Idle".into(),
                destination: "Running".into()
            }
        );
        assert_eq!(
            one("condition for T1 is pressure is high"),
            Command::Condition {
                transition: "T1".into(),
                text: "pressure is high".into()
            }
        );
    }

    #[test]
    fn test_several_families_fire_in_table_order() {
        let block = "F1 is composed of F1a\n\
                     # comment\n\
                     \n\
                     F1 is a function\n\
                     F1a is a function\n\
                     this is nonsense";
        let recognized = Recognizer::new().unwrap().recognize(block);

        assert_eq!(recognized.commands.len(), 3);
        assert!(matches!(recognized.commands[0], Command::Declare { .. }));
        assert!(matches!(recognized.commands[1], Command::Declare { .. }));
        assert!(matches!(recognized.commands[2], Command::Compose { .. }));
        assert_eq!(recognized.unrecognized, vec!["this is nonsense".to_string()]);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            one("Goal: Reduce noise"),
            Command::Statement {
                kind: ObjectKind::Goal,
                text: "Reduce noise".into()
            }
        );
        assert_eq!(
            one("SHOW F1"),
            Command::Show { name: "F1".into() }
        );
    }
}
