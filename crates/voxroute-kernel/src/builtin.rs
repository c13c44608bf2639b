//! The meal-planning app's built-in catalog.
//!
//! Declaration order is routing priority.  Keep short, generic words out of
//! hub keywords: the token-overlap fallback lets a single shared token pull
//! an utterance into the first hub that contains it.

use crate::catalog::{Catalog, FeatureDefinition, HubSize, LegacyMapping, SubOption};

impl Catalog {
    /// The catalog shipped with the app.
    pub fn builtin() -> Self {
        Self {
            hubs: builtin_hubs(),
            direct_pages: builtin_direct_pages(),
            legacy: builtin_legacy(),
        }
    }
}

fn builtin_hubs() -> Vec<FeatureDefinition> {
    vec![
        FeatureDefinition::hub(
            "CRAVING_HUB",
            "/craving-creator-landing",
            &["craving", "cravings", "sweet tooth", "snack attack"],
            vec![
                SubOption::new(
                    "CRAVING_CREATOR",
                    "Craving Creator",
                    "/craving-creator",
                    &["creator", "create", "custom"],
                )
                .with_narration("Opening Craving Creator. Tell me what you're craving."),
                SubOption::new(
                    "CRAVING_PRESETS",
                    "Craving Presets",
                    "/craving-presets",
                    &["presets", "preset", "ready made", "quick"],
                ),
            ],
        )
        .with_legacy_id("craving-creator")
        .with_selection_prompt(
            "You're in the Craving Hub. Say 'Creator' to build a craving-friendly meal, \
             or 'Presets' for ready-made options.",
        )
        .with_voice_timeout_message("Still there? Say 'Creator' or 'Presets'.")
        .with_description("The Craving Hub turns cravings into healthier meals."),
        FeatureDefinition::hub(
            "DIABETIC_HUB",
            "/diabetic-hub",
            &["diabetic", "diabetes", "blood sugar friendly", "low glycemic"],
            vec![
                SubOption::new(
                    "DIABETIC_SUPPORT",
                    "Diabetic Support",
                    "/diabetic-support",
                    &["support", "tips", "guidance"],
                ),
                SubOption::new(
                    "DIABETIC_BUILDER",
                    "Diabetic Builder",
                    "/diabetic-builder",
                    &["builder", "build", "meal builder"],
                ),
            ],
        )
        .with_description("The Diabetic Hub has glucose-aware guidance and a meal builder."),
        FeatureDefinition::hub(
            "KIDS_HUB",
            "/kids-hub",
            &["kids", "kid friendly", "children", "toddler", "lunchbox"],
            vec![
                SubOption::new("KIDS_MEALS", "Kids Meals", "/kids-meals", &["kids", "school"]),
                SubOption::new(
                    "TODDLER_MEALS",
                    "Toddler Meals",
                    "/toddler-meals",
                    &["toddler", "baby", "little ones"],
                ),
                SubOption::new(
                    "LUNCHBOX_PLANNER",
                    "Lunchbox Planner",
                    "/lunchbox-planner",
                    &["lunchbox", "lunch box", "packed lunch"],
                ),
            ],
        ),
        FeatureDefinition::hub(
            "MEAL_PLANNING_HUB",
            "/planner",
            &["meal planner", "meal planning", "plan my meals"],
            vec![
                SubOption::new(
                    "WEEKLY_PLANNER",
                    "Weekly Planner",
                    "/weekly-planner",
                    &["weekly", "week"],
                ),
                SubOption::new(
                    "AI_MEAL_CREATOR",
                    "AI Meal Creator",
                    "/ai-meal-creator",
                    &["ai meal", "ai creator", "creator", "generate"],
                ),
                SubOption::new(
                    "MEAL_PREP",
                    "Meal Prep",
                    "/meal-prep",
                    &["prep", "batch"],
                ),
                SubOption::new(
                    "POTLUCK_PLANNER",
                    "Potluck Planner",
                    "/potluck-planner",
                    &["potluck", "party"],
                ),
            ],
        )
        .with_hub_size(HubSize::Large),
        FeatureDefinition::hub(
            "TRACKING_HUB",
            "/tracking",
            &["tracking", "progress report"],
            vec![SubOption::new(
                "PROGRESS_TRACKER",
                "Progress Tracker",
                "/progress-tracker",
                &["progress"],
            )],
        ),
    ]
}

fn builtin_direct_pages() -> Vec<FeatureDefinition> {
    vec![
        FeatureDefinition::page(
            "SHOPPING_LIST",
            "/shopping-list",
            &["shopping list", "grocery list", "groceries"],
        )
        .with_description("Your shopping list collects everything you need to buy."),
        FeatureDefinition::page("PANTRY", "/pantry", &["pantry", "kitchen inventory"])
            .with_description("The pantry tracks what you already have at home."),
        FeatureDefinition::page(
            "FRIDGE_RESCUE",
            "/fridge-rescue",
            &["fridge rescue", "leftovers", "whats in my fridge"],
        )
        .with_legacy_id("fridge-rescue"),
        FeatureDefinition::page(
            "WEEKLY_BOARD",
            "/weekly-meal-board",
            &["weekly board", "meal board"],
        )
        .with_legacy_id("weekly-meal-board"),
        FeatureDefinition::page(
            "MACRO_CALCULATOR",
            "/macro-counter",
            &["macro calculator", "macros"],
        ),
        FeatureDefinition::page(
            "BIOMETRICS",
            "/my-biometrics",
            &["biometrics", "my weight", "blood pressure"],
        ),
        FeatureDefinition::page("SETTINGS", "/settings", &["settings", "preferences"]),
    ]
}

fn builtin_legacy() -> Vec<LegacyMapping> {
    vec![
        LegacyMapping::new(
            "/recipe-library",
            Some("recipe-library"),
            &["recipe library", "saved recipes", "cookbook"],
        ),
        LegacyMapping::new(
            "/holiday-feast",
            Some("holiday-feast"),
            &["holiday feast", "thanksgiving", "christmas dinner"],
        ),
        LegacyMapping::new(
            "/restaurant-guide",
            Some("restaurant-guide"),
            &["restaurant", "eating out", "dining out"],
        ),
        LegacyMapping::new("/glp1-hub", None, &["glp1", "glp 1", "ozempic"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().expect("builtin catalog must validate");
        assert!(catalog.hubs.iter().all(|h| h.is_hub));
        assert!(catalog.direct_pages.iter().all(|p| !p.is_hub));
    }

    #[test]
    fn builtin_hub_order_is_stable() {
        let ids: Vec<_> = Catalog::builtin()
            .hubs
            .iter()
            .map(|h| h.id.clone())
            .collect();
        assert_eq!(
            ids,
            vec![
                "CRAVING_HUB",
                "DIABETIC_HUB",
                "KIDS_HUB",
                "MEAL_PLANNING_HUB",
                "TRACKING_HUB"
            ]
        );
    }

    #[test]
    fn meal_planning_aliases_ignore_words_containing_ai() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("MEAL_PLANNING_HUB").unwrap();

        for query in ["explain that again", "the main one", "wait"] {
            assert!(
                crate::registry::find_sub_option_by_alias(hub, query).is_none(),
                "{query:?} should not select a sub-option"
            );
        }
        let option = crate::registry::find_sub_option_by_alias(hub, "the AI meal creator").unwrap();
        assert_eq!(option.id, "AI_MEAL_CREATOR");
    }
}
