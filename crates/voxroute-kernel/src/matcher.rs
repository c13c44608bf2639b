//! Fuzzy keyword matching.
//!
//! Matching is a boolean heuristic, not a score: a query either matches a
//! keyword or it does not, and callers take the first keyword that does.
//! The policy sits behind [`MatchPolicy`] so the tiering logic in the
//! registry never depends on how two strings are compared.

use crate::text::{normalize, tokenize};

/// Decides whether a spoken query refers to a trigger phrase.
pub trait MatchPolicy: Send + Sync {
    /// Return `true` if `query` should be considered a hit for `keyword`.
    fn score_match(&self, query: &str, keyword: &str) -> bool;
}

/// The default policy: bidirectional substring containment on normalized
/// text, then bidirectional token containment as a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringTokenPolicy;

impl MatchPolicy for SubstringTokenPolicy {
    fn score_match(&self, query: &str, keyword: &str) -> bool {
        matches(query, keyword)
    }
}

/// Bidirectional substring test, then token-overlap fallback.
///
/// An empty normalized query or keyword never matches; containment of the
/// empty string would otherwise make every keyword a hit.
pub fn matches(query: &str, keyword: &str) -> bool {
    let query_norm = normalize(query);
    let keyword_norm = normalize(keyword);

    if contains_either_way(&query_norm, &keyword_norm) {
        return true;
    }

    let query_tokens = tokenize(&query_norm);
    let keyword_tokens = tokenize(&keyword_norm);

    query_tokens.iter().any(|q| {
        keyword_tokens
            .iter()
            .any(|k| k.contains(q.as_str()) || q.contains(k.as_str()))
    })
}

/// `true` if either already-normalized string contains the other.
pub fn contains_either_way(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}
