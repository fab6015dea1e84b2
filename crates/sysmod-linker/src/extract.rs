//! Candidate object references from tagged clauses

use sysmod_domain::{PosTag, TaggedToken};

/// Candidate reference strings found in a tagged clause, most specific first
///
/// Three sources, in order: the whole clause without determiners (a function
/// name such as "open door"), phrases bridged by an infinitive marker (the
/// full word runs on both sides, then just the nearest words), and runs of nouns (optionally led by adjectives) together with
/// their shorter tails.
pub fn candidates(tokens: &[TaggedToken], max_words: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |s: String| {
        if !s.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(&s)) {
            out.push(s);
        }
    };

    // The whole clause keeps its "to" so "convert fuel to power" survives intact
    let phrase_only = tokens
        .iter()
        .all(|t| is_word(t.tag) || matches!(t.tag, PosTag::Determiner | PosTag::InfinitiveMarker));
    let phrase: Vec<&TaggedToken> = tokens.iter().filter(|t| t.tag != PosTag::Determiner).collect();
    let word_count = phrase.iter().filter(|t| is_word(t.tag)).count();
    if phrase_only && word_count > 0 && word_count <= max_words {
        push(join(&phrase));
    }

    for (i, marker) in tokens.iter().enumerate() {
        if marker.tag != PosTag::InfinitiveMarker {
            continue;
        }
        let left = tokens[..i].iter().rev().take_while(|t| is_word(t.tag)).count();
        let right = tokens[i + 1..].iter().take_while(|t| is_word(t.tag)).count();
        if left == 0 || right == 0 {
            continue;
        }
        // Full runs on both sides, then the closest word on each side
        let full = &tokens[i - left..=i + right];
        if left + right <= max_words {
            push(join(&full.iter().collect::<Vec<_>>()));
        }
        push(format!("{} {} {}", tokens[i - 1].text, marker.text, tokens[i + 1].text));
    }

    let mut run: Vec<&TaggedToken> = Vec::new();
    for token in tokens.iter().chain(std::iter::once(&TaggedToken::new("", PosTag::Other))) {
        if token.tag.is_nominal() || token.tag == PosTag::Adjective {
            run.push(token);
            continue;
        }
        while run.last().is_some_and(|t| !t.tag.is_nominal()) {
            run.pop();
        }
        for start in 0..run.len() {
            let tail = &run[start..];
            if tail.len() <= max_words {
                push(tail.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "));
            }
        }
        run.clear();
    }

    out
}

fn join(tokens: &[&TaggedToken]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word(tag: PosTag) -> bool {
    tag.is_nominal() || matches!(tag, PosTag::Verb | PosTag::Adjective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PosTag::*;

    fn toks(words: &[(&str, PosTag)]) -> Vec<TaggedToken> {
        words.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect()
    }

    #[test]
    fn test_noun_runs_and_tails() {
        let tokens = toks(&[
            ("the", Determiner),
            ("main", Adjective),
            ("fuel", NounSingular),
            ("pump", NounSingular),
            ("of", Other),
            ("Engine", ProperNoun),
        ]);
        let c = candidates(&tokens, 4);
        assert_eq!(c, vec!["main fuel pump", "fuel pump", "pump", "Engine"]);
    }

    #[test]
    fn test_infinitive_bridge() {
        let tokens = toks(&[
            ("convert", Verb),
            ("fuel", NounSingular),
            ("to", InfinitiveMarker),
            ("power", NounSingular),
        ]);
        let c = candidates(&tokens, 4);
        assert_eq!(c[0], "convert fuel to power");
        assert!(c.contains(&"fuel to power".to_string()));
        assert!(c.contains(&"power".to_string()));
    }

    #[test]
    fn test_infinitive_bridge_inside_longer_clause() {
        let tokens = toks(&[
            ("convert", Verb),
            ("fuel", NounSingular),
            ("to", InfinitiveMarker),
            ("power", NounSingular),
            ("of", Other),
            ("Engine", ProperNoun),
        ]);
        let c = candidates(&tokens, 4);
        assert_eq!(c[0], "convert fuel to power");
        assert!(c.contains(&"fuel to power".to_string()));
    }

    #[test]
    fn test_function_phrase() {
        let tokens = toks(&[("open", Verb), ("the", Determiner), ("door", NounSingular)]);
        let c = candidates(&tokens, 4);
        assert_eq!(c, vec!["open door", "door"]);
    }

    #[test]
    fn test_long_runs_limited() {
        let tokens = toks(&[
            ("a", NounSingular),
            ("b", NounSingular),
            ("c", NounSingular),
        ]);
        let c = candidates(&tokens, 2);
        assert_eq!(c, vec!["b c", "c"]);
    }
}
