//! Kind module - the closed set of object kinds and type references

use crate::ObjectId;
use serde::{Deserialize, Serialize};

/// The closed enumeration of model object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A transformation of inputs into outputs
    Function,
    /// A named flow exchanged between functions
    Data,
    /// A mode of the system during which functions are active
    State,
    /// A move from one state to another
    Transition,
    /// A logical component realizing functions and states
    FunctionalElement,
    /// A hardware or software part realizing functional elements
    PhysicalElement,
    /// The boundary of a functional element carrying data
    FunctionalInterface,
    /// The boundary of a physical element carrying functional interfaces
    PhysicalInterface,
    /// The physical-layer counterpart of a function
    Activity,
    /// A named property describing other objects
    Attribute,
    /// A textual need satisfied by other objects
    Requirement,
    /// A stakeholder goal satisfied by other objects
    Goal,
    /// A user-defined extension of another kind
    Type,
    /// A named filter over heterogeneous objects (also called a chain)
    View,
}

impl ObjectKind {
    /// Every kind, in declaration order
    pub const ALL: [ObjectKind; 14] = [
        ObjectKind::Function,
        ObjectKind::Data,
        ObjectKind::State,
        ObjectKind::Transition,
        ObjectKind::FunctionalElement,
        ObjectKind::PhysicalElement,
        ObjectKind::FunctionalInterface,
        ObjectKind::PhysicalInterface,
        ObjectKind::Activity,
        ObjectKind::Attribute,
        ObjectKind::Requirement,
        ObjectKind::Goal,
        ObjectKind::Type,
        ObjectKind::View,
    ];

    /// Get the kind name as it appears in commands
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Function => "function",
            ObjectKind::Data => "data",
            ObjectKind::State => "state",
            ObjectKind::Transition => "transition",
            ObjectKind::FunctionalElement => "functional element",
            ObjectKind::PhysicalElement => "physical element",
            ObjectKind::FunctionalInterface => "functional interface",
            ObjectKind::PhysicalInterface => "physical interface",
            ObjectKind::Activity => "activity",
            ObjectKind::Attribute => "attribute",
            ObjectKind::Requirement => "requirement",
            ObjectKind::Goal => "goal",
            ObjectKind::Type => "type",
            ObjectKind::View => "view",
        }
    }

    /// Parse a kind from a command word, accepting plurals and a few synonyms
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        Self::parse_singular(&normalized).or_else(|| {
            let singular = if let Some(stem) = normalized.strip_suffix("ies") {
                format!("{}y", stem)
            } else if let Some(stem) = normalized.strip_suffix('s') {
                stem.to_string()
            } else {
                return None;
            };
            Self::parse_singular(&singular)
        })
    }

    fn parse_singular(s: &str) -> Option<Self> {
        match s {
            "function" => Some(ObjectKind::Function),
            "data" | "datum" => Some(ObjectKind::Data),
            "state" => Some(ObjectKind::State),
            "transition" => Some(ObjectKind::Transition),
            "functional element" => Some(ObjectKind::FunctionalElement),
            "physical element" => Some(ObjectKind::PhysicalElement),
            "functional interface" => Some(ObjectKind::FunctionalInterface),
            "physical interface" => Some(ObjectKind::PhysicalInterface),
            "activity" => Some(ObjectKind::Activity),
            "attribute" => Some(ObjectKind::Attribute),
            "requirement" => Some(ObjectKind::Requirement),
            "goal" => Some(ObjectKind::Goal),
            "type" => Some(ObjectKind::Type),
            "view" | "chain" => Some(ObjectKind::View),
            _ => None,
        }
    }

    /// Whether objects of this kind form a composition tree
    pub fn is_composable(&self) -> bool {
        matches!(
            self,
            ObjectKind::Function
                | ObjectKind::State
                | ObjectKind::FunctionalElement
                | ObjectKind::PhysicalElement
                | ObjectKind::Requirement
                | ObjectKind::Goal
        )
    }

    /// Whether objects of this kind may be allocated to a requirement or goal
    pub fn can_satisfy(&self) -> bool {
        !matches!(
            self,
            ObjectKind::Requirement | ObjectKind::Goal | ObjectKind::Type | ObjectKind::Attribute
        )
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid object kind: {}", s))
    }
}

/// The type an object was declared with
///
/// Either one of the closed base kinds, or a user-defined Type whose extension
/// chain eventually reaches a base kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "ref", content = "value")]
pub enum TypeRef {
    /// A closed base kind
    Base(ObjectKind),
    /// A user-defined Type object
    Custom(ObjectId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_parse_plurals_and_synonyms() {
        assert_eq!(ObjectKind::parse("functions"), Some(ObjectKind::Function));
        assert_eq!(ObjectKind::parse("Activities"), Some(ObjectKind::Activity));
        assert_eq!(ObjectKind::parse("functional_elements"), Some(ObjectKind::FunctionalElement));
        assert_eq!(ObjectKind::parse("chain"), Some(ObjectKind::View));
        assert_eq!(ObjectKind::parse("widget"), None);
    }

    #[test]
    fn test_composable_kinds() {
        assert!(ObjectKind::Function.is_composable());
        assert!(ObjectKind::Requirement.is_composable());
        assert!(!ObjectKind::Data.is_composable());
        assert!(!ObjectKind::FunctionalInterface.is_composable());
    }
}
