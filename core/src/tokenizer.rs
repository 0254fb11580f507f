use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

/// Tokens shorter than this (in characters) are dropped as noise.
pub const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{M}\p{N}]+").expect("valid regex");
}

/// A normalized word plus the byte span it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub span: Range<usize>,
}

/// Tokenize text on non-alphanumeric boundaries, lower-casing each word.
///
/// Spans index into the original `text`, not the lower-cased term, so callers
/// can highlight the source string directly. Used by both the index builder
/// and the query path.
pub fn tokenize(text: &str) -> Vec<Token> {
    RE.find_iter(text)
        .filter(|m| m.as_str().chars().count() >= MIN_TOKEN_CHARS)
        .map(|m| Token { term: m.as_str().to_lowercase(), span: m.range() })
        .collect()
}

/// Tokenize a query, keeping first-occurrence order and dropping repeats.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .into_iter()
        .map(|t| t.term)
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.term).collect()
    }

    #[test]
    fn basic_tokenize() {
        assert_eq!(terms("The Reaction DSL"), vec!["the", "reaction", "dsl"]);
    }

    #[test]
    fn splits_on_punctuation_and_drops_short() {
        assert_eq!(terms("X + Y --> XY, 2.0"), vec!["xy"]);
        assert_eq!(terms("DiffEqBiological.jl"), vec!["diffeqbiological", "jl"]);
    }

    #[test]
    fn spans_point_into_source() {
        let text = "Full documentation";
        let toks = tokenize(text);
        assert_eq!(&text[toks[1].span.clone()], "documentation");
    }

    #[test]
    fn no_diacritic_folding() {
        assert_eq!(terms("Café"), vec!["café"]);
    }

    #[test]
    fn query_terms_dedup_in_order() {
        assert_eq!(query_terms("rate Rate law a"), vec!["rate", "law"]);
        assert!(query_terms("a b ?").is_empty());
    }
}
