//! Session state: the hub sub-dialog and sticky feature context.
//!
//! The hub session is a two-state machine:
//!
//! ```text
//!            enter(hub)                     cancel phrase
//!   Idle ───────────────▶ HubActive ───────────────────────▶ Idle
//!                          │   ▲  │        sub-option alias
//!                          └───┘  └────────────────────────▶ Idle
//!                        re-prompt
//! ```
//!
//! While a hub is active, only its cancel phrases and sub-option aliases are
//! consulted; fresh feature discovery does not run.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voxroute_kernel::text::normalize;
use voxroute_kernel::{FeatureDefinition, SubOption, find_sub_option_by_alias};

/// Phrases that abandon a pending hub selection.
pub const DEFAULT_CANCEL_PHRASES: &[&str] = &["cancel", "go back", "exit", "never mind"];

// ---------------------------------------------------------------------------
// Active feature context
// ---------------------------------------------------------------------------

/// The feature the user was last working in.  Used to resolve short,
/// context-dependent commands such as "add milk".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveFeature {
    ShoppingList,
    Pantry,
    WeeklyBoard,
    FridgeRescue,
    Biometrics,
    MacroGoals,
}

impl ActiveFeature {
    pub const ALL: [ActiveFeature; 6] = [
        Self::ShoppingList,
        Self::Pantry,
        Self::WeeklyBoard,
        Self::FridgeRescue,
        Self::Biometrics,
        Self::MacroGoals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShoppingList => "shopping-list",
            Self::Pantry => "pantry",
            Self::WeeklyBoard => "weekly-board",
            Self::FridgeRescue => "fridge-rescue",
            Self::Biometrics => "biometrics",
            Self::MacroGoals => "macro-goals",
        }
    }
}

impl fmt::Display for ActiveFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("unknown feature `{s}`"))
    }
}

// ---------------------------------------------------------------------------
// Hub session
// ---------------------------------------------------------------------------

/// A hub awaiting a sub-option choice.
#[derive(Debug, Clone)]
pub struct ActiveHub {
    pub hub: FeatureDefinition,
    pub entered_at: DateTime<Utc>,
    /// How many times the prompt was repeated without progress.
    pub reprompts: u32,
}

/// What an utterance did to an active hub session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubTurn {
    /// A cancel phrase was heard; the session is now idle.
    Cancelled { hub: FeatureDefinition },
    /// A sub-option alias matched; the session is now idle.
    Selected {
        hub: FeatureDefinition,
        option: SubOption,
    },
    /// Nothing matched; the session is unchanged.
    Reprompt { hub: FeatureDefinition },
}

/// Holds the single pending hub, if any.
#[derive(Debug, Default)]
pub struct HubSessionController {
    current: Option<ActiveHub>,
}

impl HubSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle → HubActive.  Replaces any previously pending hub.
    pub fn enter(&mut self, hub: FeatureDefinition) {
        tracing::info!(hub_id = %hub.id, "hub session opened");
        self.current = Some(ActiveHub {
            hub,
            entered_at: Utc::now(),
            reprompts: 0,
        });
    }

    /// Drop the pending hub and return it.
    pub fn clear(&mut self) -> Option<ActiveHub> {
        let cleared = self.current.take();
        if let Some(active) = &cleared {
            let open_ms = (Utc::now() - active.entered_at).num_milliseconds();
            tracing::info!(
                hub_id = %active.hub.id,
                open_ms,
                reprompts = active.reprompts,
                "hub session cleared"
            );
        }
        cleared
    }

    pub fn current(&self) -> Option<&ActiveHub> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// End the pending hub if the utterance contains a cancel phrase.
    ///
    /// Returns `None` when idle or when no cancel phrase was heard.
    pub fn cancel<S: AsRef<str>>(
        &mut self,
        utterance: &str,
        cancel_phrases: &[S],
    ) -> Option<HubTurn> {
        self.current.as_ref()?;
        let normalized = normalize(utterance);
        let cancelled = cancel_phrases.iter().any(|phrase| {
            let phrase = normalize(phrase.as_ref());
            !phrase.is_empty() && normalized.contains(&phrase)
        });
        if !cancelled {
            return None;
        }
        let hub = self.clear().map(|a| a.hub)?;
        Some(HubTurn::Cancelled { hub })
    }

    /// Resolve an utterance against the pending hub.
    ///
    /// Returns `None` when idle.  Cancel phrases are checked before
    /// sub-option aliases.
    pub fn resolve<S: AsRef<str>>(
        &mut self,
        utterance: &str,
        cancel_phrases: &[S],
    ) -> Option<HubTurn> {
        if let Some(turn) = self.cancel(utterance, cancel_phrases) {
            return Some(turn);
        }
        let active = self.current.as_mut()?;

        if let Some(option) = find_sub_option_by_alias(&active.hub, utterance).cloned() {
            tracing::debug!(hub_id = %active.hub.id, option_id = %option.id, "sub-option matched");
            let hub = self.clear().map(|a| a.hub)?;
            return Some(HubTurn::Selected { hub, option });
        }

        active.reprompts += 1;
        tracing::debug!(
            hub_id = %active.hub.id,
            reprompts = active.reprompts,
            "no sub-option matched; re-prompting"
        );
        Some(HubTurn::Reprompt {
            hub: active.hub.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// All mutable routing state of one session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub hub: HubSessionController,
    pub last_active_feature: Option<ActiveFeature>,
}

#[cfg(test)]
mod tests {
    use voxroute_kernel::Catalog;

    use super::*;

    fn craving_hub() -> FeatureDefinition {
        Catalog::builtin().feature("CRAVING_HUB").unwrap().clone()
    }

    #[test]
    fn idle_controller_resolves_nothing() {
        let mut controller = HubSessionController::new();
        assert!(controller.resolve("creator", DEFAULT_CANCEL_PHRASES).is_none());
    }

    #[test]
    fn every_cancel_phrase_exits() {
        for phrase in ["cancel", "Go back!", "exit please", "oh, never mind"] {
            let mut controller = HubSessionController::new();
            controller.enter(craving_hub());
            match controller.resolve(phrase, DEFAULT_CANCEL_PHRASES) {
                Some(HubTurn::Cancelled { hub }) => assert_eq!(hub.id, "CRAVING_HUB"),
                other => panic!("expected Cancelled for {phrase:?}, got {other:?}"),
            }
            assert!(!controller.is_active());
        }
    }

    #[test]
    fn cancel_wins_over_alias() {
        let mut controller = HubSessionController::new();
        controller.enter(craving_hub());
        assert!(matches!(
            controller.resolve("cancel the creator", DEFAULT_CANCEL_PHRASES),
            Some(HubTurn::Cancelled { .. })
        ));
    }

    #[test]
    fn cancel_only_reacts_to_cancel_phrases() {
        let mut controller = HubSessionController::new();
        assert!(controller.cancel("cancel", DEFAULT_CANCEL_PHRASES).is_none());

        controller.enter(craving_hub());
        assert!(controller.cancel("creator", DEFAULT_CANCEL_PHRASES).is_none());
        assert!(controller.is_active());
        assert!(matches!(
            controller.cancel("never mind, show the weekly board", DEFAULT_CANCEL_PHRASES),
            Some(HubTurn::Cancelled { .. })
        ));
        assert!(!controller.is_active());
    }

    #[test]
    fn alias_selects_and_clears() {
        let mut controller = HubSessionController::new();
        controller.enter(craving_hub());
        match controller.resolve("creator", DEFAULT_CANCEL_PHRASES) {
            Some(HubTurn::Selected { option, .. }) => {
                assert_eq!(option.id, "CRAVING_CREATOR");
                assert_eq!(option.route, "/craving-creator");
            }
            other => panic!("expected Selected, got {other:?}"),
        }
        assert!(controller.current().is_none());
    }

    #[test]
    fn unmatched_reprompts_and_keeps_state() {
        let mut controller = HubSessionController::new();
        controller.enter(craving_hub());
        for _ in 0..3 {
            assert!(matches!(
                controller.resolve("diabetic hub", DEFAULT_CANCEL_PHRASES),
                Some(HubTurn::Reprompt { .. })
            ));
        }
        let active = controller.current().expect("still active");
        assert_eq!(active.hub.id, "CRAVING_HUB");
        assert_eq!(active.reprompts, 3);
    }

    #[test]
    fn custom_cancel_phrases() {
        let mut controller = HubSessionController::new();
        controller.enter(craving_hub());
        let phrases = vec!["stop".to_string()];
        assert!(matches!(
            controller.resolve("cancel", &phrases),
            Some(HubTurn::Reprompt { .. })
        ));
        assert!(matches!(
            controller.resolve("stop", &phrases),
            Some(HubTurn::Cancelled { .. })
        ));
    }

    #[test]
    fn active_feature_parses_loosely() {
        assert_eq!("Shopping List".parse(), Ok(ActiveFeature::ShoppingList));
        assert_eq!("pantry".parse(), Ok(ActiveFeature::Pantry));
        assert_eq!("macro_goals".parse(), Ok(ActiveFeature::MacroGoals));
        assert!("garage".parse::<ActiveFeature>().is_err());
    }
}
