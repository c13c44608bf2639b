//! Command table and action shapes.
//!
//! A [`Command`] is a named, stateless handler.  Handlers receive a
//! [`CommandContext`] that exposes the host callbacks and the sticky
//! feature context, and nothing else.  The table is built once and is
//! read-only afterwards.
//!
//! [`Action`] is the closed set of things a UI (or the fallback
//! interpreter) can ask the engine to do; see
//! [`RoutingSession::execute_command`](crate::RoutingSession::execute_command).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use voxroute_kernel::PhraseRouter;

use crate::error::{IntentError, Result};
use crate::host::{HostHandlers, Response};
use crate::session::{ActiveFeature, SessionState};

// ---------------------------------------------------------------------------
// Command ids
// ---------------------------------------------------------------------------

pub const OPEN_WEEKLY_BOARD: &str = "open-weekly-board";
pub const OPEN_FRIDGE_RESCUE: &str = "open-fridge-rescue";
pub const LOG_BIOMETRICS: &str = "log-biometrics";
pub const SET_MACRO_GOALS: &str = "set-macro-goals";
pub const OPEN_SHOPPING_LIST: &str = "open-shopping-list";
pub const OPEN_PANTRY: &str = "open-pantry";
pub const ADD_SHOPPING_ITEM: &str = "add-shopping-item";
pub const ADD_PANTRY_ITEM: &str = "add-pantry-item";
pub const REMOVE_SHOPPING_ITEM: &str = "remove-shopping-item";
pub const REMOVE_PANTRY_ITEM: &str = "remove-pantry-item";
pub const LOG_WEIGHT: &str = "log-weight";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Payload key that turns a `custom` action into a voice query.
pub const VOICE_QUERY_KEY: &str = "voiceQuery";

/// A request to the command executor.
///
/// Decoded from JSON such as `{"kind": "navigate", "to": "/pantry"}`.
/// Required fields are optional at the type level so that a missing field
/// is reported as [`IntentError::MalformedAction`] rather than as a decode
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    RunCommand {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        payload: Value,
    },
    Navigate {
        #[serde(default)]
        to: Option<String>,
    },
    OpenModal {
        #[serde(default)]
        id: Option<String>,
    },
    Custom {
        #[serde(default)]
        payload: Value,
    },
}

impl Action {
    pub fn run(id: impl Into<String>) -> Self {
        Self::RunCommand {
            id: Some(id.into()),
            payload: Value::Null,
        }
    }

    pub fn navigate(to: impl Into<String>) -> Self {
        Self::Navigate {
            to: Some(to.into()),
        }
    }

    pub fn open_modal(id: impl Into<String>) -> Self {
        Self::OpenModal {
            id: Some(id.into()),
        }
    }

    /// A custom action carrying a voice query.
    pub fn voice_query(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self::Custom {
            payload: serde_json::json!({ VOICE_QUERY_KEY: text }),
        }
    }

    /// Decode an action from JSON.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| IntentError::MalformedAction {
            kind: "unknown".into(),
            reason: e.to_string(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunCommand { .. } => "run-command",
            Self::Navigate { .. } => "navigate",
            Self::OpenModal { .. } => "open-modal",
            Self::Custom { .. } => "custom",
        }
    }

    /// The voice query carried by a `custom` action, if any.
    pub fn voice_query_text(&self) -> Option<&str> {
        match self {
            Self::Custom { payload } => payload.get(VOICE_QUERY_KEY)?.as_str(),
            _ => None,
        }
    }

    /// Check the required fields before anything runs.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            Self::RunCommand { id, .. } => required_field(id, kind, "id").map(drop),
            Self::Navigate { to } => required_field(to, kind, "to").map(drop),
            Self::OpenModal { id } => required_field(id, kind, "id").map(drop),
            Self::Custom { .. } => Ok(()),
        }
    }
}

/// A required, non-blank action field.
pub(crate) fn required_field<'a>(
    field: &'a Option<String>,
    kind: &str,
    name: &str,
) -> Result<&'a str> {
    field
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| IntentError::MalformedAction {
            kind: kind.into(),
            reason: format!("missing `{name}`"),
        })
}

// ---------------------------------------------------------------------------
// Command context
// ---------------------------------------------------------------------------

/// What a command handler may touch.
pub struct CommandContext<'a> {
    pub(crate) host: &'a HostHandlers,
    pub(crate) state: &'a mut SessionState,
    pub(crate) payload: &'a Value,
}

impl CommandContext<'_> {
    pub fn navigate(&self, path: &str) {
        self.host.navigate(path);
    }

    pub fn respond(&self, response: Response) {
        self.host.respond(Some(&response));
    }

    pub fn clear_response(&self) {
        self.host.respond(None);
    }

    pub fn open_modal(&self, modal_id: &str) {
        self.host.open_modal(modal_id);
    }

    pub fn set_active_feature(&mut self, feature: ActiveFeature) {
        tracing::debug!(feature = %feature, "active feature set by command");
        self.state.last_active_feature = Some(feature);
    }

    pub fn last_active_feature(&self) -> Option<ActiveFeature> {
        self.state.last_active_feature
    }

    pub fn payload(&self) -> &Value {
        self.payload
    }

    /// A required string field of the payload.
    pub fn payload_str(&self, command_id: &str, field: &str) -> Result<&str> {
        self.payload
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| IntentError::CommandFailed {
                id: command_id.into(),
                reason: format!("payload field `{field}` is required"),
            })
    }
}

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// Handler signature for commands.
pub type CommandHandler = Arc<dyn Fn(&mut CommandContext<'_>) -> Result<()> + Send + Sync>;

/// A named side-effecting action.
#[derive(Clone)]
pub struct Command {
    pub id: String,
    pub description: String,
    handler: CommandHandler,
}

impl Command {
    pub fn new<F>(id: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub(crate) fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        (self.handler)(ctx)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registry of commands by id.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<()> {
        if self.commands.contains_key(&command.id) {
            return Err(IntentError::DuplicateCommand { id: command.id });
        }
        tracing::debug!(command_id = %command.id, "command registered");
        self.commands.insert(command.id.clone(), command);
        Ok(())
    }

    /// Look up a command; unknown ids are an error.
    pub fn get(&self, id: &str) -> Result<&Command> {
        self.commands
            .get(id)
            .ok_or_else(|| IntentError::UnknownCommand { id: id.into() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The app's built-in commands.
    pub fn builtin() -> Result<Self> {
        let mut table = Self::new();

        table.register(open_page(
            OPEN_WEEKLY_BOARD,
            "Open the weekly meal board",
            "/weekly-meal-board",
            ActiveFeature::WeeklyBoard,
            "Weekly Meal Board",
        ))?;
        table.register(open_page(
            OPEN_FRIDGE_RESCUE,
            "Open Fridge Rescue",
            "/fridge-rescue",
            ActiveFeature::FridgeRescue,
            "Fridge Rescue",
        ))?;
        table.register(open_page(
            OPEN_SHOPPING_LIST,
            "Open the shopping list",
            "/shopping-list",
            ActiveFeature::ShoppingList,
            "Shopping List",
        ))?;
        table.register(open_page(
            OPEN_PANTRY,
            "Open the pantry",
            "/pantry",
            ActiveFeature::Pantry,
            "Pantry",
        ))?;

        table.register(Command::new(
            LOG_BIOMETRICS,
            "Open the biometrics logger",
            |ctx| {
                ctx.navigate("/my-biometrics");
                ctx.open_modal("log-biometrics");
                ctx.set_active_feature(ActiveFeature::Biometrics);
                ctx.respond(Response::new(
                    "Log Biometrics",
                    "Opening your biometrics log. What would you like to record?",
                ));
                Ok(())
            },
        ))?;

        table.register(Command::new(
            SET_MACRO_GOALS,
            "Open the macro goal editor",
            |ctx| {
                ctx.navigate("/macro-counter");
                ctx.open_modal("macro-goals");
                ctx.set_active_feature(ActiveFeature::MacroGoals);
                ctx.respond(Response::new(
                    "Macro Goals",
                    "Let's set your protein, carb and fat targets.",
                ));
                Ok(())
            },
        ))?;

        table.register(list_edit(ADD_SHOPPING_ITEM, ListEdit::Add, ActiveFeature::ShoppingList))?;
        table.register(list_edit(ADD_PANTRY_ITEM, ListEdit::Add, ActiveFeature::Pantry))?;
        table.register(list_edit(
            REMOVE_SHOPPING_ITEM,
            ListEdit::Remove,
            ActiveFeature::ShoppingList,
        ))?;
        table.register(list_edit(REMOVE_PANTRY_ITEM, ListEdit::Remove, ActiveFeature::Pantry))?;

        table.register(Command::new(LOG_WEIGHT, "Record a weight entry", |ctx| {
            let value = ctx.payload_str(LOG_WEIGHT, "value")?.to_string();
            let unit = ctx
                .payload()
                .get("unit")
                .and_then(Value::as_str)
                .unwrap_or("pounds")
                .to_string();
            ctx.set_active_feature(ActiveFeature::Biometrics);
            ctx.respond(
                Response::new("Weight Logged", format!("Logged {value} {unit}.")).auto_close(true),
            );
            Ok(())
        }))?;

        Ok(table)
    }
}

fn open_page(
    id: &'static str,
    description: &str,
    route: &'static str,
    feature: ActiveFeature,
    title: &'static str,
) -> Command {
    Command::new(id, description, move |ctx| {
        ctx.navigate(route);
        ctx.set_active_feature(feature);
        ctx.respond(Response::new(title, format!("Opening {title}.")).auto_close(true));
        Ok(())
    })
}

#[derive(Debug, Clone, Copy)]
enum ListEdit {
    Add,
    Remove,
}

fn list_edit(id: &'static str, edit: ListEdit, list: ActiveFeature) -> Command {
    let list_name = match list {
        ActiveFeature::Pantry => "pantry",
        _ => "shopping list",
    };
    let description = match edit {
        ListEdit::Add => format!("Add an item to the {list_name}"),
        ListEdit::Remove => format!("Remove an item from the {list_name}"),
    };

    Command::new(id, description, move |ctx| {
        let item = ctx.payload_str(id, "item")?.to_string();
        ctx.set_active_feature(list);
        let (title, text) = match edit {
            ListEdit::Add => ("Item Added", format!("Added {item} to your {list_name}.")),
            ListEdit::Remove => (
                "Item Removed",
                format!("Removed {item} from your {list_name}."),
            ),
        };
        ctx.respond(Response::new(title, text).auto_close(true));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Literal phrases
// ---------------------------------------------------------------------------

/// High-frequency phrasings that map straight to a command, in priority
/// order.
pub const BUILTIN_LITERAL_PHRASES: &[(&str, &str)] = &[
    ("weekly meal board", OPEN_WEEKLY_BOARD),
    ("weekly board", OPEN_WEEKLY_BOARD),
    ("fridge rescue", OPEN_FRIDGE_RESCUE),
    ("what can i make with", OPEN_FRIDGE_RESCUE),
    ("log my blood sugar", LOG_BIOMETRICS),
    ("log blood sugar", LOG_BIOMETRICS),
    ("log my glucose", LOG_BIOMETRICS),
    ("log my blood pressure", LOG_BIOMETRICS),
    ("log my biometrics", LOG_BIOMETRICS),
    ("set my macro goals", SET_MACRO_GOALS),
    ("set macro goals", SET_MACRO_GOALS),
    ("set my macros", SET_MACRO_GOALS),
    ("update my macros", SET_MACRO_GOALS),
];

/// Build the command router: `(phrase, command id)` literals first, then
/// `(regex, action id)` patterns whose named captures become the payload.
pub fn command_router(
    phrases: &[(&str, &str)],
    patterns: &[(&str, &str)],
) -> Result<PhraseRouter> {
    let mut router = PhraseRouter::new();
    for (phrase, command) in phrases {
        router.add_literal(phrase, *command)?;
    }
    for (pattern, action) in patterns {
        router.add_pattern(*pattern, *action)?;
    }
    Ok(router)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
