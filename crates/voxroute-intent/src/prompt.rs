//! Hub prompt generation.

use voxroute_kernel::{FeatureDefinition, HubSize};

/// Leading label words dropped in two-option prompts ("Kids Meals" is read
/// out as "Meals").
const LABEL_PREFIXES: &[&str] = &["Craving", "Kids", "Toddler", "Diabetic"];

/// The message asking the user to pick one of a hub's sub-options.
///
/// An explicit `selection_prompt` is used verbatim.  Otherwise the prompt is
/// synthesized from the hub id and its options; large hubs ask an open
/// question instead of enumerating.
pub fn get_hub_prompt_message(hub: &FeatureDefinition) -> String {
    if let Some(prompt) = &hub.selection_prompt {
        return prompt.clone();
    }

    let intro = format!("You're in the {} Hub.", hub.display_name());

    if hub.hub_size == HubSize::Large {
        return format!("{intro} What would you like to open?");
    }

    match hub.sub_options.as_slice() {
        [] => format!("{intro} What would you like to open?"),
        [only] => format!("{intro} Would you like to open {}?", only.label),
        [first, second] => format!(
            "{intro} Say '{}' or '{}', or tap a button.",
            short_label(&first.label),
            short_label(&second.label)
        ),
        options => {
            let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
            format!("{intro} Choose from: {}", labels.join(", "))
        }
    }
}

/// What the hub says out loud: `spoken_prompt` when set, else the prompt.
pub fn get_hub_spoken_prompt(hub: &FeatureDefinition) -> String {
    hub.spoken_prompt
        .clone()
        .unwrap_or_else(|| get_hub_prompt_message(hub))
}

fn short_label(label: &str) -> &str {
    LABEL_PREFIXES
        .iter()
        .find_map(|prefix| {
            label
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(' '))
                .map(str::trim_start)
                .filter(|rest| !rest.is_empty())
        })
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use voxroute_kernel::{Catalog, SubOption};

    use super::*;

    fn hub_with(labels: &[&str]) -> FeatureDefinition {
        let options = labels
            .iter()
            .enumerate()
            .map(|(i, label)| SubOption::new(format!("OPT_{i}"), *label, format!("/{i}"), &[]))
            .collect();
        FeatureDefinition::hub("FAMILY_DINNER_HUB", "/family", &["family"], options)
    }

    #[test]
    fn explicit_selection_prompt_is_verbatim() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("CRAVING_HUB").unwrap();
        assert_eq!(
            get_hub_prompt_message(hub),
            hub.selection_prompt.clone().unwrap()
        );
    }

    #[test]
    fn two_options_strip_label_prefixes() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("DIABETIC_HUB").unwrap();
        assert_eq!(
            get_hub_prompt_message(hub),
            "You're in the Diabetic Hub. Say 'Support' or 'Builder', or tap a button."
        );
    }

    #[test]
    fn prefix_only_label_is_kept() {
        let hub = hub_with(&["Kids", "Toddler Meals"]);
        assert_eq!(
            get_hub_prompt_message(&hub),
            "You're in the Family Dinner Hub. Say 'Kids' or 'Meals', or tap a button."
        );
    }

    #[test]
    fn single_option_asks_to_open() {
        let hub = hub_with(&["Progress Tracker"]);
        assert_eq!(
            get_hub_prompt_message(&hub),
            "You're in the Family Dinner Hub. Would you like to open Progress Tracker?"
        );
    }

    #[test]
    fn three_options_are_enumerated() {
        let catalog = Catalog::builtin();
        let hub = catalog.feature("KIDS_HUB").unwrap();
        assert_eq!(
            get_hub_prompt_message(hub),
            "You're in the Kids Hub. Choose from: Kids Meals, Toddler Meals, Lunchbox Planner"
        );
    }

    #[test]
    fn large_hub_does_not_enumerate() {
        let hub = hub_with(&["A", "B"]).with_hub_size(HubSize::Large);
        assert_eq!(
            get_hub_prompt_message(&hub),
            "You're in the Family Dinner Hub. What would you like to open?"
        );
    }

    #[test]
    fn spoken_prompt_override() {
        let hub = hub_with(&["A", "B"]).with_spoken_prompt("Pick A or B.");
        assert_eq!(get_hub_spoken_prompt(&hub), "Pick A or B.");
        let plain = hub_with(&["A", "B"]);
        assert_eq!(get_hub_spoken_prompt(&plain), get_hub_prompt_message(&plain));
    }
}
