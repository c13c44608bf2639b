//! The routing session -- one user's tiered voice-query pipeline.
//!
//! [`RoutingSession::handle_voice_query`] resolves an utterance through five
//! tiers, highest priority first; each tier short-circuits on success:
//!
//! | Tier | Source | On success |
//! |------|--------|------------|
//! | 1 | built-in literal phrases, then item-edit phrasings | run the mapped command |
//! | 2 | the pending hub session, if any | cancel, select a sub-option, or re-prompt |
//! | 3 | alias registry (hubs, then direct pages) | open a hub session or navigate |
//! | 4 | legacy keyword map | navigate |
//! | 5 | slot-extracting interpreter | run a command, or answer "I heard you" |
//!
//! While a hub session is pending, tiers 3-5 never run.  Its cancel phrases
//! are checked before tier 1, and a tier 1 command ends it.
//!
//! All mutable state lives in one [`SessionState`] behind an async mutex
//! that is held for the whole utterance, including any wait for the
//! destination view.  Concurrent calls are therefore processed one at a
//! time, in lock order.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;
use voxroute_kernel::{
    Catalog, FeatureDefinition, FeatureRegistry, LegacyKeywordMap, MatchPolicy, PhraseMatch,
    PhraseRouter, hub_requires_sub_selection,
};

use crate::commands::{
    Action, BUILTIN_LITERAL_PHRASES, CommandContext, CommandTable, VOICE_QUERY_KEY,
    command_router, required_field,
};
use crate::config::RouterConfig;
use crate::error::{IntentError, Result};
use crate::flags::{FlagStore, MemoryFlagStore};
use crate::host::{
    HostHandlers, ImmediateReadiness, ModalHandler, NavigationHandler, NavigationReadiness,
    NoWalkthrough, Response, ResponseHandler, WalkthroughEngine,
};
use crate::interpreter::{
    ContextualAction, FoodCommandInterpreter, ITEM_EDIT_PATTERNS, InterpretedCommand,
    PatternInterpreter, REMOVE_ITEM, is_contextual_action, resolve_contextual_action,
};
use crate::prompt::{get_hub_prompt_message, get_hub_spoken_prompt};
use crate::session::{ActiveFeature, HubTurn, SessionState};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What handling one utterance did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// Tier 1 matched a literal phrase and ran its command.
    LiteralCommand { command: String },
    /// Tier 1 matched an item-edit phrasing and ran a list command.
    ItemCommand { command: String },
    /// Tier 3 found a hub needing a choice; a session is now pending.
    HubOpened { hub_id: String },
    /// Tier 2 heard nothing it recognised; the prompt was repeated.
    HubReprompted { hub_id: String },
    /// Tier 2 heard a cancel phrase.
    HubCancelled { hub_id: String },
    /// Tier 2 matched a sub-option and navigated to it.
    HubOptionSelected {
        hub_id: String,
        option_id: String,
        route: String,
    },
    /// Tier 3 navigated to a direct page or a single-option hub.
    Navigated { feature_id: String, route: String },
    /// Tier 4 navigated to a legacy path.
    LegacyNavigated { path: String },
    /// Tier 5 recognised a command and ran it.
    FallbackCommand { command: String },
    /// A context-dependent item edit arrived with no list context.
    NeedsClarification { action: String },
    /// Nothing recognised the utterance.
    Unrecognized,
}

/// A navigable destination and how to confirm it.
struct Destination<'a> {
    route: &'a str,
    walkthrough_id: Option<&'a str>,
    title: &'a str,
    confirmation: Option<&'a str>,
    explanation: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// RoutingSession
// ---------------------------------------------------------------------------

/// Routing state and collaborators for one hosting UI.
///
/// Construct once with [`RoutingSession::builder`] and share by reference
/// (or `Arc`).
pub struct RoutingSession {
    id: Uuid,
    registry: FeatureRegistry,
    legacy: LegacyKeywordMap,
    commands_router: PhraseRouter,
    commands: CommandTable,
    host: HostHandlers,
    readiness: Arc<dyn NavigationReadiness>,
    walkthrough: Arc<dyn WalkthroughEngine>,
    interpreter: Arc<dyn FoodCommandInterpreter>,
    flags: Arc<dyn FlagStore>,
    config: RouterConfig,
    state: Mutex<SessionState>,
}

impl RoutingSession {
    /// Start building a session over `catalog`.
    pub fn builder(catalog: Catalog) -> RoutingSessionBuilder {
        RoutingSessionBuilder::new(catalog)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // -- Entry points -------------------------------------------------------

    /// Resolve one utterance through the tiered pipeline.
    ///
    /// Only command handler failures are returned as errors; every other
    /// path ends in a response to the host.
    pub async fn handle_voice_query(&self, utterance: &str) -> Result<RouteOutcome> {
        let span = tracing::info_span!("voice_query", session_id = %self.id);
        self.route_utterance(utterance).instrument(span).await
    }

    /// Execute a UI-triggered action.
    ///
    /// Malformed actions fail before any side effect.  Every failure is
    /// logged once and returned.  A `custom` action carrying a voice query is
    /// handed to [`RoutingSession::handle_voice_query`] and its outcome is
    /// returned.
    pub async fn execute_command(&self, action: Action) -> Result<Option<RouteOutcome>> {
        let kind = action.kind();
        let result = self.execute_action(action).await;
        // Command failures are logged where the command runs.
        if let Err(e @ IntentError::MalformedAction { .. }) = &result {
            error!(kind, error = %e, "malformed action");
        }
        result
    }

    /// Record that the user entered a feature's page.
    pub async fn enter_feature(&self, feature: ActiveFeature) {
        let mut state = self.state.lock().await;
        debug!(feature = %feature, "active feature set by page entry");
        state.last_active_feature = Some(feature);
    }

    pub async fn last_active_feature(&self) -> Option<ActiveFeature> {
        self.state.lock().await.last_active_feature
    }

    /// The hub awaiting a sub-option choice, if any.
    pub async fn current_hub(&self) -> Option<FeatureDefinition> {
        let state = self.state.lock().await;
        state.hub.current().map(|active| active.hub.clone())
    }

    /// Abandon any pending hub without a response.
    pub async fn clear_hub(&self) {
        self.state.lock().await.hub.clear();
    }

    /// What to say when the user goes quiet during a hub selection.
    pub async fn hub_timeout_message(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.hub.current().map(|active| {
            active
                .hub
                .voice_timeout_message
                .clone()
                .unwrap_or_else(|| get_hub_spoken_prompt(&active.hub))
        })
    }

    // -- Pipeline -----------------------------------------------------------

    async fn route_utterance(&self, utterance: &str) -> Result<RouteOutcome> {
        let mut state = self.state.lock().await;
        debug!(utterance = %utterance, hub_active = state.hub.is_active(), "routing utterance");

        // A cancel phrase ends a pending hub before any command can run.
        if let Some(turn) = state.hub.cancel(utterance, &self.config.cancel_phrases) {
            return Ok(self.finish_hub_turn(turn).await);
        }

        // Tier 1: literal phrases, then item-edit phrasings.
        match self.commands_router.route(utterance) {
            PhraseMatch::Literal {
                handler,
                matched_phrase,
            } => {
                debug!(phrase = %matched_phrase, command = %handler, "tier 1: literal phrase");
                state.hub.clear();
                self.run_command(&mut state, &handler, &Value::Null)?;
                return Ok(RouteOutcome::LiteralCommand { command: handler });
            }
            PhraseMatch::Pattern { handler, captures } => {
                debug!(action = %handler, "tier 1: item edit");
                state.hub.clear();
                let interpreted = InterpretedCommand::from_captures(handler, captures);
                return self.run_interpreted(&mut state, interpreted, |command| {
                    RouteOutcome::ItemCommand { command }
                });
            }
            PhraseMatch::Unmatched { .. } => {}
        }

        // Tier 2: pending hub session.  Nothing below runs while it is set.
        if let Some(turn) = state.hub.resolve(utterance, &self.config.cancel_phrases) {
            return Ok(self.finish_hub_turn(turn).await);
        }

        // Tier 3: alias registry.
        if let Some(feature) = self.registry.find_feature(utterance) {
            debug!(feature_id = %feature.id, "tier 3: registry match");
            let feature = feature.clone();
            return Ok(self.open_feature(&mut state, feature).await);
        }

        // Tier 4: legacy keyword map.
        if let Some(mapping) = self.legacy.find_feature_from_keywords(utterance) {
            debug!(path = %mapping.path, "tier 4: legacy match");
            state.hub.clear();
            let title = title_from_path(&mapping.path);
            self.dispatch_destination(Destination {
                route: &mapping.path,
                walkthrough_id: mapping.walkthrough_id.as_deref(),
                title: &title,
                confirmation: None,
                explanation: None,
            })
            .await;
            return Ok(RouteOutcome::LegacyNavigated {
                path: mapping.path.clone(),
            });
        }

        // Tier 5: slot-extracting interpreter.
        self.fallback(&mut state, utterance)
    }

    async fn finish_hub_turn(&self, turn: HubTurn) -> RouteOutcome {
        match turn {
            HubTurn::Cancelled { hub } => {
                info!(hub_id = %hub.id, "hub selection cancelled");
                let response = Response::new(
                    "Hub Cancelled",
                    format!("Okay, leaving the {} Hub.", hub.display_name()),
                )
                .auto_close(true);
                self.host.respond(Some(&response));
                RouteOutcome::HubCancelled { hub_id: hub.id }
            }
            HubTurn::Selected { hub, option } => {
                info!(hub_id = %hub.id, option_id = %option.id, "hub option selected");
                self.dispatch_destination(Destination {
                    route: &option.route,
                    walkthrough_id: Some(option.id.as_str()),
                    title: &option.label,
                    confirmation: option.narration.as_deref(),
                    explanation: None,
                })
                .await;
                RouteOutcome::HubOptionSelected {
                    hub_id: hub.id,
                    option_id: option.id,
                    route: option.route,
                }
            }
            HubTurn::Reprompt { hub } => {
                self.host.respond(Some(&hub_prompt_response(&hub)));
                RouteOutcome::HubReprompted { hub_id: hub.id }
            }
        }
    }

    async fn open_feature(
        &self,
        state: &mut SessionState,
        feature: FeatureDefinition,
    ) -> RouteOutcome {
        if hub_requires_sub_selection(&feature) {
            self.host.navigate(&feature.primary_route);
            self.host.respond(Some(&hub_prompt_response(&feature)));
            let hub_id = feature.id.clone();
            state.hub.enter(feature);
            return RouteOutcome::HubOpened { hub_id };
        }

        state.hub.clear();

        let title = feature.display_name();
        let destination = match feature.sub_options.first() {
            Some(only) if feature.is_hub => Destination {
                route: &only.route,
                walkthrough_id: Some(only.id.as_str()),
                title: &only.label,
                confirmation: only.narration.as_deref(),
                explanation: feature.description.as_deref(),
            },
            _ => Destination {
                route: &feature.primary_route,
                walkthrough_id: Some(feature.walkthrough_id()),
                title: &title,
                confirmation: None,
                explanation: feature.description.as_deref(),
            },
        };
        let route = destination.route.to_string();
        self.dispatch_destination(destination).await;

        RouteOutcome::Navigated {
            feature_id: feature.id.clone(),
            route,
        }
    }

    fn fallback(&self, state: &mut SessionState, utterance: &str) -> Result<RouteOutcome> {
        let interpreted = self.interpreter.interpret(utterance);
        if interpreted.is_unknown() {
            debug!("tier 5: interpreter returned unknown");
            return Ok(self.heard_you(&interpreted.spoken_text));
        }
        self.run_interpreted(state, interpreted, |command| {
            RouteOutcome::FallbackCommand { command }
        })
    }

    /// Resolve an interpreted action against the list context and run it.
    fn run_interpreted(
        &self,
        state: &mut SessionState,
        interpreted: InterpretedCommand,
        ran: impl FnOnce(String) -> RouteOutcome,
    ) -> Result<RouteOutcome> {
        match resolve_contextual_action(&interpreted.action, state.last_active_feature) {
            ContextualAction::Ambiguous => {
                let item = interpreted
                    .payload
                    .get("item")
                    .and_then(Value::as_str)
                    .unwrap_or("that");
                let question = if interpreted.action == REMOVE_ITEM {
                    format!("Should I remove {item} from your shopping list or your pantry?")
                } else {
                    format!("Should I add {item} to your shopping list or your pantry?")
                };
                self.host
                    .respond(Some(&Response::new("Which list?", question).auto_close(false)));
                Ok(RouteOutcome::NeedsClarification {
                    action: interpreted.action,
                })
            }
            ContextualAction::Command(id) if self.commands.contains(&id) => {
                debug!(command = %id, "running interpreted command");
                self.run_command(state, &id, &interpreted.payload)?;
                Ok(ran(id))
            }
            ContextualAction::Command(id) => {
                warn!(action = %id, "interpreter produced an unregistered action");
                Ok(self.heard_you(&interpreted.spoken_text))
            }
        }
    }

    fn heard_you(&self, spoken_text: &str) -> RouteOutcome {
        self.host
            .respond(Some(&Response::new("I heard you", spoken_text).auto_close(true)));
        RouteOutcome::Unrecognized
    }

    // -- Navigation and walkthroughs ----------------------------------------

    async fn dispatch_destination(&self, destination: Destination<'_>) {
        self.host.navigate(destination.route);

        let confirmation = destination
            .confirmation
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Opening {}.", destination.title));
        let plain = Response::new(destination.title, confirmation).auto_close(true);

        let response = match destination.walkthrough_id {
            Some(script) if self.walkthrough_enabled(script) => {
                self.start_walkthrough(&destination, script, plain).await
            }
            _ => plain,
        };
        self.host.respond(Some(&response));
    }

    fn walkthrough_enabled(&self, script: &str) -> bool {
        let autoplay = self
            .flags
            .get_bool(&self.config.walkthrough_autoplay_flag)
            .unwrap_or(true);
        autoplay && self.walkthrough.has_script(script)
    }

    async fn start_walkthrough(
        &self,
        destination: &Destination<'_>,
        script: &str,
        plain: Response,
    ) -> Response {
        if let Err(e) = self.wait_for_navigation(destination.route).await {
            warn!(error = %e, script, "skipping walkthrough");
            return match destination.explanation {
                Some(text) => Response::new(destination.title, text).auto_close(true),
                None => plain,
            };
        }

        let outcome = self.walkthrough.begin_script_walkthrough(script).await;
        if outcome.success {
            info!(script, "walkthrough started");
            outcome.response.unwrap_or(plain)
        } else {
            debug!(script, "walkthrough did not start");
            plain
        }
    }

    async fn wait_for_navigation(&self, path: &str) -> Result<()> {
        tokio::time::timeout(
            self.config.navigation_ready_timeout(),
            self.readiness.wait_until_ready(path),
        )
        .await
        .map_err(|_| IntentError::NavigationTimeout {
            path: path.to_string(),
            timeout_ms: self.config.navigation_ready_timeout_ms,
        })
    }

    // -- Commands -----------------------------------------------------------

    fn run_command(&self, state: &mut SessionState, id: &str, payload: &Value) -> Result<()> {
        let command = self
            .commands
            .get(id)
            .inspect_err(|e| error!(command_id = %id, error = %e, "command lookup failed"))?;

        let mut ctx = CommandContext {
            host: &self.host,
            state,
            payload,
        };
        command
            .run(&mut ctx)
            .inspect_err(|e| error!(command_id = %id, error = %e, "command failed"))
    }

    async fn execute_action(&self, action: Action) -> Result<Option<RouteOutcome>> {
        let kind = action.kind();
        match &action {
            Action::RunCommand { id, payload } => {
                let id = required_field(id, kind, "id")?;
                let mut state = self.state.lock().await;
                self.run_command(&mut state, id, payload)?;
                Ok(None)
            }
            Action::Navigate { to } => {
                let to = required_field(to, kind, "to")?;
                self.host.navigate(to);
                Ok(None)
            }
            Action::OpenModal { id } => {
                let id = required_field(id, kind, "id")?;
                self.host.open_modal(id);
                Ok(None)
            }
            Action::Custom { payload } => {
                match payload.get(VOICE_QUERY_KEY).and_then(Value::as_str) {
                    Some(query) => Ok(Some(self.handle_voice_query(query).await?)),
                    None => {
                        debug!("custom action without a voice query ignored");
                        Ok(None)
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for RoutingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingSession")
            .field("id", &self.id)
            .field("registry", &self.registry)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

fn hub_prompt_response(hub: &FeatureDefinition) -> Response {
    Response::new(
        format!("{} Hub", hub.display_name()),
        get_hub_prompt_message(hub),
    )
    .spoken(get_hub_spoken_prompt(hub))
    .auto_close(false)
}

/// `/recipe-library` becomes `Recipe Library`.
fn title_from_path(path: &str) -> String {
    path.split(['/', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`RoutingSession`].  Every collaborator has a default: no
/// host callbacks, immediate readiness, no walkthroughs, the pattern
/// interpreter, an empty in-memory flag store, built-in commands, literal
/// phrases and item-edit patterns.
pub struct RoutingSessionBuilder {
    catalog: Catalog,
    policy: Option<Arc<dyn MatchPolicy>>,
    config: RouterConfig,
    commands: Option<CommandTable>,
    literal_phrases: Option<Vec<(String, String)>>,
    item_edit_patterns: Option<Vec<(String, String)>>,
    host: HostHandlers,
    readiness: Arc<dyn NavigationReadiness>,
    walkthrough: Arc<dyn WalkthroughEngine>,
    interpreter: Option<Arc<dyn FoodCommandInterpreter>>,
    flags: Arc<dyn FlagStore>,
}

impl RoutingSessionBuilder {
    fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            policy: None,
            config: RouterConfig::default(),
            commands: None,
            literal_phrases: None,
            item_edit_patterns: None,
            host: HostHandlers::default(),
            readiness: Arc::new(ImmediateReadiness),
            walkthrough: Arc::new(NoWalkthrough),
            interpreter: None,
            flags: Arc::new(MemoryFlagStore::new()),
        }
    }

    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn match_policy(mut self, policy: Arc<dyn MatchPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn commands(mut self, commands: CommandTable) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Replace the literal phrase table (`(phrase, command id)`, in
    /// priority order).
    pub fn literal_phrases(mut self, phrases: &[(&str, &str)]) -> Self {
        self.literal_phrases = Some(
            phrases
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect(),
        );
        self
    }

    /// Replace the item-edit patterns (`(regex, action id)`, in priority
    /// order).  Named captures become the command payload; `add-item` and
    /// `remove-item` resolve through the last active feature.
    pub fn item_edit_patterns(mut self, patterns: &[(&str, &str)]) -> Self {
        self.item_edit_patterns = Some(
            patterns
                .iter()
                .map(|(p, a)| ((*p).to_string(), (*a).to_string()))
                .collect(),
        );
        self
    }

    pub fn navigation_handler(mut self, handler: impl NavigationHandler + 'static) -> Self {
        self.host.navigation = Some(Arc::new(handler));
        self
    }

    pub fn response_handler(mut self, handler: impl ResponseHandler + 'static) -> Self {
        self.host.response = Some(Arc::new(handler));
        self
    }

    pub fn modal_handler(mut self, handler: impl ModalHandler + 'static) -> Self {
        self.host.modal = Some(Arc::new(handler));
        self
    }

    pub fn navigation_readiness(mut self, readiness: impl NavigationReadiness + 'static) -> Self {
        self.readiness = Arc::new(readiness);
        self
    }

    pub fn walkthrough(mut self, engine: impl WalkthroughEngine + 'static) -> Self {
        self.walkthrough = Arc::new(engine);
        self
    }

    pub fn interpreter(mut self, interpreter: impl FoodCommandInterpreter + 'static) -> Self {
        self.interpreter = Some(Arc::new(interpreter));
        self
    }

    pub fn flags(mut self, flags: impl FlagStore + 'static) -> Self {
        self.flags = Arc::new(flags);
        self
    }

    /// Validate the catalog, compile the command router and check that every
    /// literal phrase and explicit item-edit pattern targets a registered
    /// command.
    pub fn build(self) -> Result<RoutingSession> {
        self.catalog.validate()?;

        let commands = match self.commands {
            Some(table) => table,
            None => CommandTable::builtin()?,
        };

        let phrases: Vec<(&str, &str)> = match &self.literal_phrases {
            Some(phrases) => phrases
                .iter()
                .map(|(p, c)| (p.as_str(), c.as_str()))
                .collect(),
            None => BUILTIN_LITERAL_PHRASES.to_vec(),
        };
        let patterns: Vec<(&str, &str)> = match &self.item_edit_patterns {
            Some(patterns) => patterns
                .iter()
                .map(|(p, a)| (p.as_str(), a.as_str()))
                .collect(),
            None => ITEM_EDIT_PATTERNS.to_vec(),
        };
        let commands_router = command_router(&phrases, &patterns)?;
        let direct_targets = patterns
            .iter()
            .map(|(_, action)| *action)
            .filter(|action| !is_contextual_action(action));
        for target in phrases.iter().map(|(_, command)| *command).chain(direct_targets) {
            commands.get(target)?;
        }

        let interpreter: Arc<dyn FoodCommandInterpreter> = match self.interpreter {
            Some(interpreter) => interpreter,
            None => Arc::new(PatternInterpreter::new()?),
        };

        let legacy = LegacyKeywordMap::new(self.catalog.legacy.clone());
        let registry = match self.policy {
            Some(policy) => FeatureRegistry::with_policy(self.catalog, policy),
            None => FeatureRegistry::new(self.catalog),
        };

        let session = RoutingSession {
            id: Uuid::now_v7(),
            registry,
            legacy,
            commands_router,
            commands,
            host: self.host,
            readiness: self.readiness,
            walkthrough: self.walkthrough,
            interpreter,
            flags: self.flags,
            config: self.config,
            state: Mutex::new(SessionState::default()),
        };

        info!(
            session_id = %session.id,
            commands = session.commands.len(),
            literal_phrases = session.commands_router.literal_count(),
            item_edit_patterns = session.commands_router.pattern_count(),
            legacy_mappings = session.legacy.len(),
            "routing session ready"
        );
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
