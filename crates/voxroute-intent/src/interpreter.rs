//! Slot-extracting fallback interpreter.
//!
//! The last tier of the pipeline.  An interpreter turns a free-form food
//! command into an action id plus payload, or returns the
//! [`UNKNOWN_ACTION`] sentinel.  [`PatternInterpreter`] is the default
//! implementation, built on the kernel's regex routes with named captures.
//! The routing session also matches [`ITEM_EDIT_PATTERNS`] in its first
//! tier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voxroute_kernel::{PhraseMatch, PhraseRouter};

use crate::commands::{
    ADD_PANTRY_ITEM, ADD_SHOPPING_ITEM, LOG_WEIGHT, REMOVE_PANTRY_ITEM, REMOVE_SHOPPING_ITEM,
};
use crate::error::Result;
use crate::session::ActiveFeature;

/// Sentinel action for "nothing recognized".
pub const UNKNOWN_ACTION: &str = "unknown";

/// Add an item to whichever list the user is working in.
pub const ADD_ITEM: &str = "add-item";
/// Remove an item from whichever list the user is working in.
pub const REMOVE_ITEM: &str = "remove-item";

const UNKNOWN_SPOKEN: &str =
    "Sorry, I didn't catch a command in that. Try saying 'add milk' or 'open my pantry'.";

/// Output of an interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedCommand {
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    pub spoken_text: String,
}

impl InterpretedCommand {
    pub fn unknown(spoken_text: impl Into<String>) -> Self {
        Self {
            action: UNKNOWN_ACTION.into(),
            payload: Value::Null,
            spoken_text: spoken_text.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.action == UNKNOWN_ACTION
    }
}

/// Pattern-based command interpreter.
pub trait FoodCommandInterpreter: Send + Sync {
    fn interpret(&self, text: &str) -> InterpretedCommand;
}

// ---------------------------------------------------------------------------
// PatternInterpreter
// ---------------------------------------------------------------------------

/// Item-edit phrasings, in priority order.  Explicit targets come before
/// the context-dependent `add-item`/`remove-item` forms.
///
/// The routing session matches these ahead of feature discovery, so a list
/// or food name inside the phrase cannot open a feature page instead.
pub const ITEM_EDIT_PATTERNS: &[(&str, &str)] = &[
    (
        r"^(?:please )?add (?P<item>.+?) to (?:my |the )?(?:shopping|grocery) list$",
        ADD_SHOPPING_ITEM,
    ),
    (
        r"^(?:please )?(?:add|put) (?P<item>.+?) (?:to|in|into) (?:my |the )?pantry$",
        ADD_PANTRY_ITEM,
    ),
    (
        r"^(?:please )?(?:remove|delete) (?P<item>.+?) from (?:my |the )?(?:shopping|grocery) list$",
        REMOVE_SHOPPING_ITEM,
    ),
    (
        r"^(?:please )?(?:remove|delete) (?P<item>.+?) from (?:my |the )?pantry$",
        REMOVE_PANTRY_ITEM,
    ),
    (r"^(?:please )?(?:add|put) (?P<item>.+)$", ADD_ITEM),
    (r"^(?:please )?(?:remove|delete) (?P<item>.+)$", REMOVE_ITEM),
];

/// Remaining food commands, tried after [`ITEM_EDIT_PATTERNS`].
const FOOD_PATTERNS: &[(&str, &str)] = &[(
    r"^(?:please )?log (?P<value>\d+) ?(?P<unit>pounds|lbs|kilograms|kilos|kg)$",
    LOG_WEIGHT,
)];

/// The default [`FoodCommandInterpreter`].
#[derive(Debug)]
pub struct PatternInterpreter {
    router: PhraseRouter,
}

impl PatternInterpreter {
    /// Build the interpreter with the built-in item-edit and food patterns.
    pub fn new() -> Result<Self> {
        Self::from_routes(ITEM_EDIT_PATTERNS.iter().chain(FOOD_PATTERNS))
    }

    /// Build an interpreter from `(regex, action id)` pairs.
    pub fn with_patterns(patterns: &[(&str, &str)]) -> Result<Self> {
        Self::from_routes(patterns.iter())
    }

    fn from_routes<'a>(routes: impl Iterator<Item = &'a (&'a str, &'a str)>) -> Result<Self> {
        let mut router = PhraseRouter::new();
        for (pattern, action) in routes {
            router.add_pattern(*pattern, *action)?;
        }
        Ok(Self { router })
    }
}

impl FoodCommandInterpreter for PatternInterpreter {
    fn interpret(&self, text: &str) -> InterpretedCommand {
        match self.router.route(text) {
            PhraseMatch::Pattern { handler, captures } => {
                InterpretedCommand::from_captures(handler, captures)
            }
            _ => InterpretedCommand::unknown(UNKNOWN_SPOKEN),
        }
    }
}

impl InterpretedCommand {
    /// Turn a pattern match into a command whose payload holds the named
    /// captures as strings.
    pub fn from_captures(action: String, captures: HashMap<String, String>) -> Self {
        let spoken_text = spoken_for(&action, &captures);
        let payload: Map<String, Value> = captures
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        Self {
            action,
            payload: Value::Object(payload),
            spoken_text,
        }
    }
}

fn spoken_for(action: &str, captures: &HashMap<String, String>) -> String {
    let item = captures.get("item").map(String::as_str).unwrap_or("that");
    match action {
        ADD_SHOPPING_ITEM | ADD_PANTRY_ITEM | ADD_ITEM => format!("Adding {item}."),
        REMOVE_SHOPPING_ITEM | REMOVE_PANTRY_ITEM | REMOVE_ITEM => format!("Removing {item}."),
        LOG_WEIGHT => "Logging your weight.".to_string(),
        _ => "Okay.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Context resolution
// ---------------------------------------------------------------------------

/// How an interpreted action maps onto a concrete command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextualAction {
    /// Run this command id.
    Command(String),
    /// The action depends on context that is not available.
    Ambiguous,
}

/// Resolve context-dependent actions against the last active feature.
/// Other actions pass through unchanged.
pub fn resolve_contextual_action(
    action: &str,
    last_active: Option<ActiveFeature>,
) -> ContextualAction {
    let target = match (action, last_active) {
        (ADD_ITEM, Some(ActiveFeature::ShoppingList)) => ADD_SHOPPING_ITEM,
        (ADD_ITEM, Some(ActiveFeature::Pantry)) => ADD_PANTRY_ITEM,
        (REMOVE_ITEM, Some(ActiveFeature::ShoppingList)) => REMOVE_SHOPPING_ITEM,
        (REMOVE_ITEM, Some(ActiveFeature::Pantry)) => REMOVE_PANTRY_ITEM,
        (ADD_ITEM | REMOVE_ITEM, _) => return ContextualAction::Ambiguous,
        (other, _) => other,
    };
    ContextualAction::Command(target.to_string())
}

/// Whether `action` is resolved through [`resolve_contextual_action`] rather
/// than naming a command directly.
pub fn is_contextual_action(action: &str) -> bool {
    matches!(action, ADD_ITEM | REMOVE_ITEM)
}
