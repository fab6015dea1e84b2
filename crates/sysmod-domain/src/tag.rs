//! Part-of-speech vocabulary shared by taggers and the requirement linker

use serde::{Deserialize, Serialize};

/// The fixed tag vocabulary returned by taggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    /// Singular or mass noun
    NounSingular,
    /// Plural noun
    NounPlural,
    /// Proper noun (names, identifiers)
    ProperNoun,
    /// Article or other determiner
    Determiner,
    /// Adjective
    Adjective,
    /// Verb, including modals
    Verb,
    /// The infinitive marker "to"
    InfinitiveMarker,
    /// Coordinating conjunction
    Coordinator,
    /// Subordinating conjunction or clause connective
    Subordinator,
    /// Pronoun
    Pronoun,
    /// Punctuation, numbers and anything else
    Other,
}

impl PosTag {
    /// Whether the tag can start or continue an object reference
    pub fn is_nominal(&self) -> bool {
        matches!(self, PosTag::NounSingular | PosTag::NounPlural | PosTag::ProperNoun)
    }
}

/// A token with its tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Token text as it appeared
    pub text: String,
    /// Assigned tag
    pub tag: PosTag,
}

impl TaggedToken {
    /// Create a tagged token
    pub fn new(text: impl Into<String>, tag: PosTag) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}
