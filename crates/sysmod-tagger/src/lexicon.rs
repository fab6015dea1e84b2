//! Word-list tagger
//!
//! Tokens come from a single regular expression; each word is then looked up
//! in closed word lists (determiners, pronouns, connectives, modal and common
//! verbs, prepositions) before falling back to suffix and capitalization rules.
//! Unknown lower-case words are nouns, which is what the linker wants: model
//! object names are overwhelmingly noun phrases.

use regex::Regex;
use std::sync::LazyLock;
use sysmod_domain::traits::PosTagger;
use sysmod_domain::{PosTag, TaggedToken};
use tracing::debug;

use crate::TaggerError;

static TOKEN_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9_'\-]*|\d+(?:\.\d+)?|[^\sA-Za-z0-9]"));

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "all", "any", "some",
    "no", "its", "their", "his", "her", "our", "your", "my",
];

const PRONOUNS: &[&str] = &[
    "it", "they", "them", "he", "she", "we", "you", "i", "me", "us", "him", "which", "who",
    "whom", "itself", "themselves",
];

const COORDINATORS: &[&str] = &["and", "or", "but", "nor"];

const SUBORDINATORS: &[&str] = &[
    "if", "when", "while", "then", "after", "before", "until", "unless", "because", "once",
    "whenever", "whereas", "since", "as",
];

const MODALS: &[&str] = &["shall", "must", "should", "will", "can", "may", "might", "could", "would"];

const VERBS: &[&str] = &[
    "is", "are", "be", "been", "being", "was", "were", "has", "have", "had", "do", "does", "did",
    "provide", "provides", "allow", "allows", "produce", "produces", "consume", "consumes",
    "ensure", "ensures", "support", "supports", "perform", "performs", "receive", "receives",
    "send", "sends", "open", "opens", "close", "closes", "maintain", "maintains",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "from", "with", "into", "within", "without", "under",
    "over", "through", "between", "during", "than", "not", "per", "via",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["able", "ible", "ous", "ful", "less", "ive"];

/// Tagger driven by closed word lists and suffix rules
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    /// Create a new tagger
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into word, number and punctuation tokens
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>, TaggerError> {
        let re = TOKEN_RE
            .as_ref()
            .map_err(|e| TaggerError::Tokenization(e.to_string()))?;
        Ok(re.find_iter(text).map(|m| m.as_str().to_string()).collect())
    }

    fn classify(&self, word: &str, previous: Option<&str>, sentence_start: bool) -> PosTag {
        let first = word.chars().next().unwrap_or(' ');
        if !first.is_alphabetic() {
            return PosTag::Other;
        }

        let lower = word.to_lowercase();
        let lower = lower.as_str();

        if lower == "to" {
            return PosTag::InfinitiveMarker;
        }
        if DETERMINERS.contains(&lower) {
            return PosTag::Determiner;
        }
        if PRONOUNS.contains(&lower) {
            return PosTag::Pronoun;
        }
        if COORDINATORS.contains(&lower) {
            return PosTag::Coordinator;
        }
        if SUBORDINATORS.contains(&lower) {
            return PosTag::Subordinator;
        }
        if MODALS.contains(&lower) || VERBS.contains(&lower) {
            return PosTag::Verb;
        }
        if PREPOSITIONS.contains(&lower) {
            return PosTag::Other;
        }
        // "shall <verb>", "does not <verb>"
        let after_modal = previous.is_some_and(|p| MODALS.contains(&p) || p == "not");
        if after_modal && first.is_lowercase() && !word.chars().any(|c| c.is_ascii_digit()) {
            return PosTag::Verb;
        }
        if word.chars().any(|c| c.is_ascii_digit()) {
            return PosTag::ProperNoun;
        }
        if first.is_uppercase() && !sentence_start {
            return PosTag::ProperNoun;
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| lower.len() > s.len() + 2 && lower.ends_with(s)) {
            return PosTag::Adjective;
        }
        if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
            return PosTag::NounPlural;
        }
        PosTag::NounSingular
    }
}

impl PosTagger for LexiconTagger {
    type Error = TaggerError;

    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, Self::Error> {
        let tokens = self.tokenize(text)?;
        let mut tagged: Vec<TaggedToken> = Vec::with_capacity(tokens.len());
        let mut sentence_start = true;
        let mut previous: Option<String> = None;

        for token in tokens {
            let tag = self.classify(&token, previous.as_deref(), sentence_start);
            sentence_start = matches!(token.as_str(), "." | "!" | "?" | ":" | ";");
            previous = Some(token.to_lowercase());
            tagged.push(TaggedToken::new(token, tag));
        }

        debug!("Tagged {} tokens", tagged.len());
        Ok(tagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<PosTag> {
        LexiconTagger::new()
            .tag(text)
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect()
    }

    #[test]
    fn test_requirement_sentence() {
        assert_eq!(
            tags("The system shall open the door"),
            vec![
                PosTag::Determiner,
                PosTag::NounSingular,
                PosTag::Verb,
                PosTag::Verb,
                PosTag::Determiner,
                PosTag::NounSingular,
            ]
        );
    }

    #[test]
    fn test_modal_followed_by_unknown_verb() {
        let t = tags("The pump shall pressurize fuel");
        assert_eq!(t[3], PosTag::Verb);
        assert_eq!(t[4], PosTag::NounSingular);
    }

    #[test]
    fn test_infinitive_bridge() {
        assert_eq!(
            tags("convert to power"),
            vec![PosTag::NounSingular, PosTag::InfinitiveMarker, PosTag::NounSingular]
        );
    }

    #[test]
    fn test_proper_nouns_and_plurals() {
        let t = tags("when Engine feeds F1a with valves, it stops");
        assert_eq!(t[0], PosTag::Subordinator);
        assert_eq!(t[1], PosTag::ProperNoun);
        assert_eq!(t[2], PosTag::NounPlural);
        assert_eq!(t[3], PosTag::ProperNoun);
        assert_eq!(t[4], PosTag::Other);
        assert_eq!(t[5], PosTag::NounPlural);
        assert_eq!(t[6], PosTag::Other);
        assert_eq!(t[7], PosTag::Pronoun);
    }

    #[test]
    fn test_adjectives() {
        let t = tags("a reliable pump");
        assert_eq!(t, vec![PosTag::Determiner, PosTag::Adjective, PosTag::NounSingular]);
    }

    #[test]
    fn test_tokenize_keeps_punctuation() {
        let tokens = LexiconTagger::new().tokenize("if x, then y.").unwrap();
        assert_eq!(tokens, vec!["if", "x", ",", "then", "y", "."]);
    }

    #[test]
    fn test_token_pattern_is_shared() {
        let first = TOKEN_RE.as_ref().unwrap();
        let tagger = LexiconTagger::new();
        tagger.tokenize("F1 produces a").unwrap();
        tagger.tokenize("F2 consumes a").unwrap();
        assert!(std::ptr::eq(first, TOKEN_RE.as_ref().unwrap()));
    }
}
