//! Integration tests for the voxroute-kernel crate.
//!
//! These tests exercise catalog loading, the alias registry, the legacy map
//! and the phrase router together, the way the session engine uses them.

use std::sync::Arc;

use voxroute_kernel::{
    Catalog, FeatureDefinition, FeatureRegistry, KernelError, LegacyKeywordMap, MatchPolicy,
    PhraseMatch, PhraseRouter, SubOption, find_sub_option_by_alias, hub_requires_sub_selection,
};

// ═══════════════════════════════════════════════════════════════════════
//  Catalog loading
// ═══════════════════════════════════════════════════════════════════════

const CATALOG_TOML: &str = r#"
[[hubs]]
id = "SNACK_HUB"
primary_route = "/snacks"
keywords = ["snack"]

[[hubs.sub_options]]
id = "SWEET"
label = "Sweet Snacks"
route = "/snacks/sweet"
aliases = ["sweet"]

[[hubs.sub_options]]
id = "SALTY"
label = "Salty Snacks"
route = "/snacks/salty"
aliases = ["salty", "chips"]

[[direct_pages]]
id = "PANTRY"
primary_route = "/pantry"
keywords = ["pantry"]

[[legacy]]
path = "/recipe-library"
walkthrough_id = "recipe-library"
keywords = ["cookbook"]
"#;

#[test]
fn load_toml_catalog_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(&path, CATALOG_TOML).unwrap();

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog.hubs.len(), 1);
    assert!(catalog.hubs[0].is_hub);
    assert_eq!(catalog.direct_pages[0].id, "PANTRY");
    assert_eq!(
        catalog.legacy[0].walkthrough_id.as_deref(),
        Some("recipe-library")
    );
}

#[test]
fn load_json_catalog_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let json = serde_json::to_string(&Catalog::builtin()).unwrap();
    std::fs::write(&path, json).unwrap();

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog, Catalog::builtin());
}

#[test]
fn load_missing_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Catalog::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(KernelError::CatalogParse { .. })));
}

#[test]
fn load_rejects_hub_without_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        "[[hubs]]\nid = \"EMPTY_HUB\"\nprimary_route = \"/empty\"\nkeywords = [\"empty\"]\n",
    )
    .unwrap();

    match Catalog::load(&path) {
        Err(KernelError::InvalidCatalog { reason }) => assert!(reason.contains("EMPTY_HUB")),
        other => panic!("expected InvalidCatalog, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Registry, legacy map and router together
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn registry_then_legacy_tiering() {
    let catalog = Catalog::from_toml_str(CATALOG_TOML).unwrap();
    let legacy = LegacyKeywordMap::new(catalog.legacy.clone());
    let registry = FeatureRegistry::new(catalog);

    let hub = registry.find_feature("I want a snack").unwrap();
    assert_eq!(hub.id, "SNACK_HUB");
    assert!(hub_requires_sub_selection(hub));
    assert_eq!(
        find_sub_option_by_alias(hub, "some CHIPS please").map(|o| o.route.as_str()),
        Some("/snacks/salty")
    );

    assert!(registry.find_feature("open the cookbook").is_none());
    let mapping = legacy.find_feature_from_keywords("open the cookbook").unwrap();
    assert_eq!(mapping.path, "/recipe-library");
}

#[test]
fn builtin_catalog_routes_known_phrases() {
    let registry = FeatureRegistry::new(Catalog::builtin());

    let cases = [
        ("I have a craving", "CRAVING_HUB"),
        ("diabetic hub", "DIABETIC_HUB"),
        ("lunchbox ideas", "KIDS_HUB"),
        ("open my pantry", "PANTRY"),
        ("show my grocery list", "SHOPPING_LIST"),
        ("change my settings", "SETTINGS"),
    ];
    for (query, expected) in cases {
        let found = registry.find_feature(query).map(|f| f.id.as_str());
        assert_eq!(found, Some(expected), "query {query:?}");
    }

    assert!(registry.find_feature("xyzzy nonsense").is_none());
    assert!(registry.find_feature("").is_none());
}

#[test]
fn single_option_hub_needs_no_selection() {
    let catalog = Catalog::builtin();
    let tracking = catalog.feature("TRACKING_HUB").unwrap();
    assert!(tracking.is_hub);
    assert!(!hub_requires_sub_selection(tracking));

    let pantry = catalog.feature("PANTRY").unwrap();
    assert!(!hub_requires_sub_selection(pantry));
}

#[test]
fn custom_policy_is_used_by_registry() {
    struct FirstWordOnly;

    impl MatchPolicy for FirstWordOnly {
        fn score_match(&self, query: &str, keyword: &str) -> bool {
            query.split_whitespace().next() == Some(keyword)
        }
    }

    let catalog = Catalog::new(
        vec![FeatureDefinition::hub(
            "A_HUB",
            "/a",
            &["alpha"],
            vec![SubOption::new("A1", "Alpha One", "/a/1", &["one"])],
        )],
        vec![FeatureDefinition::page("B_PAGE", "/b", &["beta"])],
        vec![],
    )
    .unwrap();
    let registry = FeatureRegistry::with_policy(catalog, Arc::new(FirstWordOnly));

    assert_eq!(registry.find_feature("beta please").map(|f| f.id.as_str()), Some("B_PAGE"));
    assert!(registry.find_feature("please beta").is_none());
}

#[test]
fn router_literal_priority_and_patterns() {
    let mut router = PhraseRouter::new();
    router.add_literal("weekly board", "open-weekly-board").unwrap();
    router.add_literal("board", "open-any-board").unwrap();
    router
        .add_pattern(r"^add (?P<item>.+)$", "add-item")
        .unwrap();

    match router.route("Open the WEEKLY board!") {
        PhraseMatch::Literal {
            handler,
            matched_phrase,
        } => {
            assert_eq!(handler, "open-weekly-board");
            assert_eq!(matched_phrase, "weekly board");
        }
        other => panic!("expected Literal, got {other:?}"),
    }

    match router.route("add  oat milk") {
        PhraseMatch::Pattern { handler, captures } => {
            assert_eq!(handler, "add-item");
            assert_eq!(captures.get("item").map(String::as_str), Some("oat milk"));
        }
        other => panic!("expected Pattern, got {other:?}"),
    }

    assert_eq!(
        router.route("hello there"),
        PhraseMatch::Unmatched {
            text: "hello there".into()
        }
    );
}

#[test]
fn router_rejects_bad_input() {
    let mut router = PhraseRouter::new();
    assert!(matches!(
        router.add_literal("?!", "nothing"),
        Err(KernelError::RouterBuildError { .. })
    ));
    assert!(matches!(
        router.add_pattern("(unclosed", "broken"),
        Err(KernelError::InvalidPattern { .. })
    ));
    assert_eq!(router.literal_count(), 0);
    assert_eq!(router.pattern_count(), 0);
}
