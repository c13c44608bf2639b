//! Alias registry -- hub-first feature discovery.
//!
//! [`FeatureRegistry::find_feature`] scans hubs before direct pages, each in
//! declaration order, and returns the first feature with a keyword accepted by
//! the configured [`MatchPolicy`].  Hubs therefore always outrank direct
//! pages, and earlier features outrank later ones.
//!
//! # Example
//!
//! ```rust
//! # use voxroute_kernel::{Catalog, FeatureRegistry};
//! let registry = FeatureRegistry::new(Catalog::builtin());
//!
//! let hub = registry.find_feature("I have a craving").unwrap();
//! assert_eq!(hub.id, "CRAVING_HUB");
//!
//! let page = registry.find_feature("open my pantry").unwrap();
//! assert_eq!(page.id, "PANTRY");
//! ```

use std::sync::Arc;

use crate::catalog::{Catalog, FeatureDefinition, SubOption};
use crate::matcher::{MatchPolicy, SubstringTokenPolicy, contains_either_way};
use crate::text::normalize;

/// Read-only lookup over the hubs and direct pages of a [`Catalog`].
///
/// Cheap to clone; the catalog and policy are shared.
#[derive(Clone)]
pub struct FeatureRegistry {
    catalog: Arc<Catalog>,
    policy: Arc<dyn MatchPolicy>,
}

impl FeatureRegistry {
    /// Create a registry using the default substring/token policy.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_policy(catalog, Arc::new(SubstringTokenPolicy))
    }

    /// Create a registry with a custom match policy.
    pub fn with_policy(catalog: Catalog, policy: Arc<dyn MatchPolicy>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            policy,
        }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Find the feature an utterance refers to.
    ///
    /// Hubs are scanned first, then direct pages; `None` if nothing matched.
    pub fn find_feature(&self, query: &str) -> Option<&FeatureDefinition> {
        let found = self
            .first_match(&self.catalog.hubs, query)
            .or_else(|| self.first_match(&self.catalog.direct_pages, query));

        match found {
            Some((feature, keyword)) => {
                tracing::debug!(
                    query = %query,
                    feature_id = %feature.id,
                    keyword = %keyword,
                    is_hub = feature.is_hub,
                    "registry match"
                );
                Some(feature)
            }
            None => {
                tracing::trace!(query = %query, "no registry match");
                None
            }
        }
    }

    fn first_match<'a>(
        &self,
        features: &'a [FeatureDefinition],
        query: &str,
    ) -> Option<(&'a FeatureDefinition, &'a str)> {
        features.iter().find_map(|feature| {
            feature
                .keywords
                .iter()
                .find(|keyword| self.policy.score_match(query, keyword))
                .map(|keyword| (feature, keyword.as_str()))
        })
    }
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("hubs", &self.catalog.hubs.len())
            .field("direct_pages", &self.catalog.direct_pages.len())
            .finish_non_exhaustive()
    }
}

/// Find the sub-option of `hub` whose alias the utterance refers to.
///
/// Only the query is normalized, and only bidirectional substring
/// containment is tested (no token overlap); the first alias hit in
/// sub-option order wins.
pub fn find_sub_option_by_alias<'a>(
    hub: &'a FeatureDefinition,
    query: &str,
) -> Option<&'a SubOption> {
    let query = normalize(query);
    hub.sub_options.iter().find(|option| {
        option
            .aliases
            .iter()
            .any(|alias| contains_either_way(&query, alias))
    })
}

/// `true` if selecting `feature` needs an extra turn to pick a sub-option.
pub fn hub_requires_sub_selection(feature: &FeatureDefinition) -> bool {
    feature.is_hub && feature.sub_options.len() > 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubOption;

    fn shared_keyword_catalog() -> Catalog {
        Catalog::new(
            vec![FeatureDefinition::hub(
                "PLANNING_HUB",
                "/planning",
                &["plan"],
                vec![
                    SubOption::new("WEEK", "Week", "/week", &["week"]),
                    SubOption::new("DAY", "Day", "/day", &["day"]),
                ],
            )],
            vec![FeatureDefinition::page("PLAN_PAGE", "/plan", &["plan"])],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn hub_outranks_direct_page_on_shared_keyword() {
        let registry = FeatureRegistry::new(shared_keyword_catalog());
        let found = registry.find_feature("plan").expect("match");
        assert_eq!(found.id, "PLANNING_HUB");
    }

    #[test]
    fn earlier_feature_wins_within_tier() {
        let catalog = Catalog::new(
            vec![],
            vec![
                FeatureDefinition::page("FIRST", "/first", &["recipes"]),
                FeatureDefinition::page("SECOND", "/second", &["recipes"]),
            ],
            vec![],
        )
        .unwrap();
        let registry = FeatureRegistry::new(catalog);
        assert_eq!(registry.find_feature("show recipes").unwrap().id, "FIRST");
    }

    #[test]
    fn lookup_is_deterministic() {
        let registry = FeatureRegistry::new(Catalog::builtin());
        let first = registry.find_feature("diabetic hub").map(|f| f.id.clone());
        for _ in 0..10 {
            assert_eq!(
                registry.find_feature("diabetic hub").map(|f| f.id.clone()),
                first
            );
        }
        assert_eq!(first.as_deref(), Some("DIABETIC_HUB"));
    }

    #[test]
    fn no_match_returns_none() {
        let registry = FeatureRegistry::new(Catalog::builtin());
        assert!(registry.find_feature("xyzzy nonsense").is_none());
        assert!(registry.find_feature("").is_none());
    }

    #[test]
    fn custom_policy_is_used() {
        struct ExactOnly;
        impl MatchPolicy for ExactOnly {
            fn score_match(&self, query: &str, keyword: &str) -> bool {
                normalize(query) == normalize(keyword)
            }
        }

        let registry = FeatureRegistry::with_policy(Catalog::builtin(), Arc::new(ExactOnly));
        assert!(registry.find_feature("I have a craving").is_none());
        assert_eq!(registry.find_feature("Craving!").unwrap().id, "CRAVING_HUB");
    }

    #[test]
    fn sub_option_alias_lookup() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("CRAVING_HUB").unwrap();

        assert_eq!(
            find_sub_option_by_alias(hub, "the Creator please").unwrap().id,
            "CRAVING_CREATOR"
        );
        assert_eq!(
            find_sub_option_by_alias(hub, "preset").unwrap().id,
            "CRAVING_PRESETS"
        );
        assert!(find_sub_option_by_alias(hub, "diabetic hub").is_none());
    }

    #[test]
    fn sub_option_lookup_has_no_token_fallback() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("KIDS_HUB").unwrap();
        // "packed lunch" shares the token "packed" with "packed meals" but
        // neither string contains the other.
        assert!(find_sub_option_by_alias(hub, "packed meals").is_none());
    }

    #[test]
    fn first_sibling_alias_wins() {
        let hub = FeatureDefinition::hub(
            "OVERLAP_HUB",
            "/o",
            &["overlap"],
            vec![
                SubOption::new("ONE", "One", "/1", &["meal"]),
                SubOption::new("TWO", "Two", "/2", &["meal"]),
            ],
        );
        assert_eq!(find_sub_option_by_alias(&hub, "meal").unwrap().id, "ONE");
    }

    #[test]
    fn sub_selection_requires_more_than_one_option() {
        let catalog = Catalog::builtin();
        assert!(hub_requires_sub_selection(
            catalog.feature("CRAVING_HUB").unwrap()
        ));
        assert!(!hub_requires_sub_selection(
            catalog.feature("TRACKING_HUB").unwrap()
        ));
        assert!(!hub_requires_sub_selection(catalog.feature("PANTRY").unwrap()));
    }
}
