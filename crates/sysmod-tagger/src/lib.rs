//! Sysmod Tagger Layer
//!
//! Part-of-speech tagger implementations for requirement and goal text.
//!
//! # Architecture
//!
//! This crate provides implementations of the `PosTagger` trait from
//! `sysmod-domain`. The linker only needs coarse word classes, so the taggers
//! here work from closed word lists rather than a statistical model.
//!
//! # Taggers
//!
//! - `LexiconTagger`: word lists plus suffix heuristics
//! - `MockTagger`: fixed responses for testing
//!
//! # Examples
//!
//! ```
//! use sysmod_tagger::LexiconTagger;
//! use sysmod_domain::traits::PosTagger;
//! use sysmod_domain::PosTag;
//!
//! let tagger = LexiconTagger::new();
//! let tokens = tagger.tag("The pump shall deliver fuel").unwrap();
//! assert_eq!(tokens[0].tag, PosTag::Determiner);
//! assert_eq!(tokens[1].tag, PosTag::NounSingular);
//! ```

#![warn(missing_docs)]

pub mod lexicon;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sysmod_domain::traits::PosTagger as PosTaggerTrait;
use sysmod_domain::TaggedToken;
use thiserror::Error;

pub use lexicon::LexiconTagger;

/// Errors that can occur while tagging
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Input could not be tokenized
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// Tagger state unavailable
    #[error("Tagger unavailable: {0}")]
    Unavailable(String),

    /// Generic error
    #[error("Tagger error: {0}")]
    Other(String),
}

/// Mock tagger for deterministic testing
///
/// Returns pre-configured token lists without looking at the text; texts
/// without a configured response go through a [`LexiconTagger`].
///
/// # Examples
///
/// ```
/// use sysmod_tagger::MockTagger;
/// use sysmod_domain::traits::PosTagger;
/// use sysmod_domain::{PosTag, TaggedToken};
///
/// let mut tagger = MockTagger::default();
/// tagger.add_response("fly", vec![TaggedToken::new("fly", PosTag::Verb)]);
/// assert_eq!(tagger.tag("fly").unwrap()[0].tag, PosTag::Verb);
/// assert_eq!(tagger.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTagger {
    fallback: LexiconTagger,
    responses: Arc<Mutex<HashMap<String, Option<Vec<TaggedToken>>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTagger {
    /// Create a mock with no configured responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `tokens` whenever `text` is tagged
    pub fn add_response(&mut self, text: impl Into<String>, tokens: Vec<TaggedToken>) {
        lock(&self.responses).insert(text.into(), Some(tokens));
    }

    /// Fail whenever `text` is tagged
    pub fn add_error(&mut self, text: impl Into<String>) {
        lock(&self.responses).insert(text.into(), None);
    }

    /// Get the number of times tag was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl PosTaggerTrait for MockTagger {
    type Error = TaggerError;

    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, Self::Error> {
        *lock(&self.call_count) += 1;

        match lock(&self.responses).get(text) {
            Some(Some(tokens)) => Ok(tokens.clone()),
            Some(None) => Err(TaggerError::Other("Mock error".to_string())),
            None => self.fallback.tag(text),
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmod_domain::PosTag;

    #[test]
    fn test_mock_tagger_specific_responses() {
        let mut tagger = MockTagger::new();
        tagger.add_response(
            "Fuel flows",
            vec![
                TaggedToken::new("Fuel", PosTag::ProperNoun),
                TaggedToken::new("flows", PosTag::Verb),
            ],
        );

        let tokens = tagger.tag("Fuel flows").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].tag, PosTag::Verb);
    }

    #[test]
    fn test_mock_tagger_falls_back_to_lexicon() {
        let tagger = MockTagger::new();
        let tokens = tagger.tag("the door").unwrap();
        assert_eq!(tokens[0].tag, PosTag::Determiner);
    }

    #[test]
    fn test_mock_tagger_call_count() {
        let tagger = MockTagger::new();
        assert_eq!(tagger.call_count(), 0);

        tagger.tag("a").unwrap();
        tagger.tag("b").unwrap();
        assert_eq!(tagger.call_count(), 2);

        tagger.reset_call_count();
        assert_eq!(tagger.call_count(), 0);
    }

    #[test]
    fn test_mock_tagger_error() {
        let mut tagger = MockTagger::new();
        tagger.add_error("bad text");

        let result = tagger.tag("bad text");
        assert!(matches!(result.unwrap_err(), TaggerError::Other(_)));
    }

    #[test]
    fn test_mock_tagger_clone_shares_state() {
        let first = MockTagger::new();
        let second = first.clone();

        first.tag("x").unwrap();
        assert_eq!(second.call_count(), 1);
    }
}
