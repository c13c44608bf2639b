//! Two-level phrase router.
//!
//! Resolves an utterance to a handler identifier:
//!
//! | Level | Technique | Priority on multiple hits |
//! |-------|-----------|---------------------------|
//! | 1 | Literal phrase containment via [`aho_corasick`] | earliest-registered phrase |
//! | 2 | Regex pattern with named captures via [`regex`] | earliest-registered pattern |
//!
//! Anything else comes back as [`PhraseMatch::Unmatched`].  Both levels run
//! against the normalized utterance, so literal phrases and patterns should
//! be written in lower case without punctuation.
//!
//! # Example
//!
//! ```rust
//! # use voxroute_kernel::router::{PhraseRouter, PhraseMatch};
//! let mut router = PhraseRouter::new();
//! router.add_literal("weekly board", "open-weekly-board").unwrap();
//! router.add_pattern(r"^add (?P<item>.+)$", "add-item").unwrap();
//!
//! let result = router.route("Open the weekly board, please");
//! assert!(matches!(result, PhraseMatch::Literal { .. }));
//!
//! match router.route("Add milk") {
//!     PhraseMatch::Pattern { captures, .. } => assert_eq!(captures["item"], "milk"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use std::collections::HashMap;

use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};
use crate::text::normalize;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The outcome of routing an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhraseMatch {
    /// Level 1: a registered literal phrase occurs in the utterance.
    Literal {
        handler: String,
        matched_phrase: String,
    },

    /// Level 2: a regex pattern matched; named captures are returned.
    Pattern {
        handler: String,
        captures: HashMap<String, String>,
    },

    /// Nothing matched.
    Unmatched {
        /// The normalized utterance.
        text: String,
    },
}

impl PhraseMatch {
    /// Return the handler string for any variant (empty when unmatched).
    pub fn handler(&self) -> &str {
        match self {
            Self::Literal { handler, .. } | Self::Pattern { handler, .. } => handler,
            Self::Unmatched { .. } => "",
        }
    }
}

/// A regex-based route with named captures.
#[derive(Debug, Clone)]
struct PatternRoute {
    handler: String,
    compiled: Regex,
}

// ---------------------------------------------------------------------------
// PhraseRouter
// ---------------------------------------------------------------------------

/// Literal + pattern router over normalized utterances.
///
/// Routes are registered up front; the literal automaton is rebuilt on every
/// [`PhraseRouter::add_literal`] so that routing only needs `&self`.
#[derive(Debug, Default)]
pub struct PhraseRouter {
    /// Normalized literal phrases and their handlers, in priority order.
    literals: Vec<(String, String)>,
    automaton: Option<AhoCorasick>,
    /// Evaluated in registration order.
    patterns: Vec<PatternRoute>,
}

impl PhraseRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal phrase.  Earlier phrases take priority when an
    /// utterance contains several of them.
    pub fn add_literal(
        &mut self,
        phrase: impl AsRef<str>,
        handler: impl Into<String>,
    ) -> Result<()> {
        let phrase = normalize(phrase.as_ref());
        let handler = handler.into();
        if phrase.is_empty() {
            return Err(KernelError::RouterBuildError {
                reason: format!("literal phrase for `{handler}` is empty after normalization"),
            });
        }

        tracing::debug!(phrase = %phrase, handler = %handler, "literal route added");
        self.literals.push((phrase, handler));
        self.rebuild_automaton()
    }

    /// Register a regex pattern route.  Named captures are returned in
    /// [`PhraseMatch::Pattern`].
    pub fn add_pattern(
        &mut self,
        pattern: impl Into<String>,
        handler: impl Into<String>,
    ) -> Result<()> {
        let pattern = pattern.into();
        let handler = handler.into();

        let compiled = Regex::new(&pattern).map_err(|e| KernelError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(pattern = %pattern, handler = %handler, "pattern route added");
        self.patterns.push(PatternRoute { handler, compiled });
        Ok(())
    }

    /// Route an utterance: literal phrases first, then patterns.
    pub fn route(&self, utterance: &str) -> PhraseMatch {
        let normalized = normalize(utterance);

        if let Some(result) = self.try_literal(&normalized) {
            tracing::debug!(handler = %result.handler(), "L1 literal match");
            return result;
        }

        if let Some(result) = self.try_pattern(&normalized) {
            tracing::debug!(handler = %result.handler(), "L2 pattern match");
            return result;
        }

        PhraseMatch::Unmatched { text: normalized }
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    // -- Private helpers ----------------------------------------------------

    fn rebuild_automaton(&mut self) -> Result<()> {
        let phrases: Vec<&str> = self.literals.iter().map(|(p, _)| p.as_str()).collect();
        let automaton =
            AhoCorasick::new(&phrases).map_err(|e| KernelError::RouterBuildError {
                reason: e.to_string(),
            })?;
        tracing::trace!(count = phrases.len(), "aho-corasick automaton rebuilt");
        self.automaton = Some(automaton);
        Ok(())
    }

    fn try_literal(&self, normalized: &str) -> Option<PhraseMatch> {
        let ac = self.automaton.as_ref()?;

        // Overlapping search reports every phrase present; the lowest pattern
        // index is the earliest registration.
        let idx = ac
            .find_overlapping_iter(normalized)
            .map(|mat| mat.pattern().as_usize())
            .min()?;
        let (phrase, handler) = &self.literals[idx];

        Some(PhraseMatch::Literal {
            handler: handler.clone(),
            matched_phrase: phrase.clone(),
        })
    }

    fn try_pattern(&self, normalized: &str) -> Option<PhraseMatch> {
        self.patterns.iter().find_map(|route| {
            let caps = route.compiled.captures(normalized)?;
            let captures = route
                .compiled
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().trim().to_string()))
                })
                .collect();

            Some(PhraseMatch::Pattern {
                handler: route.handler.clone(),
                captures,
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match_ignores_case_and_punctuation() {
        let mut router = PhraseRouter::new();
        router.add_literal("Fridge Rescue", "open-fridge-rescue").unwrap();

        match router.route("Let's do a FRIDGE rescue!") {
            PhraseMatch::Literal {
                handler,
                matched_phrase,
            } => {
                assert_eq!(handler, "open-fridge-rescue");
                assert_eq!(matched_phrase, "fridge rescue");
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn earliest_literal_wins() {
        let mut router = PhraseRouter::new();
        router.add_literal("log my weight", "log-biometrics").unwrap();
        router.add_literal("weight", "open-weight-page").unwrap();

        assert_eq!(router.route("please log my weight").handler(), "log-biometrics");
        assert_eq!(router.route("my weight").handler(), "open-weight-page");
    }

    #[test]
    fn pattern_match_with_captures() {
        let mut router = PhraseRouter::new();
        router
            .add_pattern(
                r"^add (?P<item>.+?) to (?:my |the )?shopping list$",
                "add-shopping-item",
            )
            .expect("valid pattern");

        match router.route("Add eggs to my shopping list.") {
            PhraseMatch::Pattern { handler, captures } => {
                assert_eq!(handler, "add-shopping-item");
                assert_eq!(captures.get("item").map(String::as_str), Some("eggs"));
            }
            other => panic!("expected Pattern, got {other:?}"),
        }
    }

    #[test]
    fn literal_takes_precedence_over_pattern() {
        let mut router = PhraseRouter::new();
        router.add_literal("set my macros", "set-macro-goals").unwrap();
        router.add_pattern(r"^set (?P<what>.+)$", "generic-set").unwrap();

        assert!(matches!(
            router.route("set my macros"),
            PhraseMatch::Literal { .. }
        ));
    }

    #[test]
    fn unmatched_returns_normalized_text() {
        let router = PhraseRouter::new();
        assert_eq!(
            router.route("  Xyzzy, nonsense! "),
            PhraseMatch::Unmatched {
                text: "xyzzy nonsense".into()
            }
        );
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let mut router = PhraseRouter::new();
        assert!(matches!(
            router.add_pattern("[invalid(", "handler"),
            Err(KernelError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn empty_literal_is_rejected() {
        let mut router = PhraseRouter::new();
        assert!(router.add_literal("?!", "nothing").is_err());
        assert_eq!(router.literal_count(), 0);
    }
}
