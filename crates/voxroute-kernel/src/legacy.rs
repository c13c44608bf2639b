//! Legacy keyword map.
//!
//! A flat list of `(path, keywords)` mappings for features that predate the
//! hub model.  Consulted only after the alias registry found nothing; there
//! is no reconciliation between the two sources, so an overlapping concept
//! always resolves through the registry.

use crate::catalog::LegacyMapping;
use crate::matcher::contains_either_way;
use crate::text::normalize;

/// Single-tier lookup over [`LegacyMapping`]s.
#[derive(Debug, Clone, Default)]
pub struct LegacyKeywordMap {
    mappings: Vec<LegacyMapping>,
}

impl LegacyKeywordMap {
    pub fn new(mappings: Vec<LegacyMapping>) -> Self {
        Self { mappings }
    }

    /// Return the first mapping with a keyword that contains, or is
    /// contained in, the normalized query.
    pub fn find_feature_from_keywords(&self, query: &str) -> Option<&LegacyMapping> {
        let query = normalize(query);
        let found = self.mappings.iter().find(|mapping| {
            mapping
                .keywords
                .iter()
                .any(|keyword| contains_either_way(&query, &normalize(keyword)))
        });

        if let Some(mapping) = found {
            tracing::debug!(query = %query, path = %mapping.path, "legacy keyword match");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn builtin_map() -> LegacyKeywordMap {
        LegacyKeywordMap::new(Catalog::builtin().legacy)
    }

    #[test]
    fn finds_mapping_by_contained_keyword() {
        let map = builtin_map();
        let found = map
            .find_feature_from_keywords("Show me my saved recipes!")
            .unwrap();
        assert_eq!(found.path, "/recipe-library");
        assert_eq!(found.walkthrough_id.as_deref(), Some("recipe-library"));
    }

    #[test]
    fn query_contained_in_keyword() {
        let map = builtin_map();
        assert_eq!(
            map.find_feature_from_keywords("holiday").unwrap().path,
            "/holiday-feast"
        );
    }

    #[test]
    fn first_mapping_wins() {
        let map = LegacyKeywordMap::new(vec![
            LegacyMapping::new("/a", None, &["dinner"]),
            LegacyMapping::new("/b", None, &["dinner party"]),
        ]);
        assert_eq!(map.find_feature_from_keywords("dinner party").unwrap().path, "/a");
    }

    #[test]
    fn no_token_overlap_matching() {
        let map = builtin_map();
        // "dining" appears in "dining out" but the phrases do not contain
        // each other.
        assert!(map.find_feature_from_keywords("dining room table").is_none());
        assert!(map.find_feature_from_keywords("xyzzy nonsense").is_none());
        assert!(map.find_feature_from_keywords("").is_none());
    }
}
