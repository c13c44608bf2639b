//! Hub-routing session engine for voxroute.
//!
//! This crate turns the kernel's matching primitives into a conversational
//! router:
//!
//! - **Pipeline**: the five-tier voice-query resolver and the command
//!   executor, both on [`pipeline::RoutingSession`].
//! - **Hub sessions**: the cancel / select / re-prompt sub-dialog via
//!   [`session::HubSessionController`], with prompts from [`prompt`].
//! - **Commands**: the named command table and action shapes in
//!   [`commands`].
//! - **Fallback**: slot-extracting food commands via
//!   [`interpreter::PatternInterpreter`].
//! - **Host seams**: navigation, responses, modals, readiness and
//!   walkthroughs are injected through the traits in [`host`]; feature
//!   flags through [`flags::FlagStore`].
//! - **Configuration**: [`config::RouterConfig`], loaded from TOML with
//!   environment overrides.

pub mod commands;
pub mod config;
pub mod error;
pub mod flags;
pub mod host;
pub mod interpreter;
pub mod pipeline;
pub mod prompt;
pub mod session;

pub use commands::{Action, Command, CommandContext, CommandHandler, CommandTable};
pub use config::RouterConfig;
pub use error::{IntentError, Result};
pub use flags::{FlagStore, FlagValue, MemoryFlagStore};
pub use host::{
    ImmediateReadiness, ModalFn, ModalHandler, NavigationHandler, NavigationReadiness,
    NoWalkthrough, Response, ResponseHandler, WalkthroughEngine, WalkthroughOutcome,
};
pub use interpreter::{FoodCommandInterpreter, InterpretedCommand, PatternInterpreter};
pub use pipeline::{RouteOutcome, RoutingSession, RoutingSessionBuilder};
pub use prompt::{get_hub_prompt_message, get_hub_spoken_prompt};
pub use session::{ActiveFeature, ActiveHub, HubSessionController, HubTurn, SessionState};
pub use voxroute_kernel::{Catalog, find_sub_option_by_alias, hub_requires_sub_selection};
