//! Host collaborator interfaces.
//!
//! The routing engine never renders UI, plays audio or waits on views
//! itself.  The hosting layer injects these capabilities when it builds a
//! [`RoutingSession`](crate::RoutingSession):
//!
//! - [`NavigationHandler`], [`ResponseHandler`], [`ModalHandler`] -- imperative
//!   callbacks.  Plain closures implement them.
//! - [`NavigationReadiness`] -- resolves once a destination view is ready.
//! - [`WalkthroughEngine`] -- optional on-screen walkthroughs;
//!   [`NoWalkthrough`] is the absent implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A message pushed to the host to be displayed and optionally spoken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub title: String,
    pub description: String,
    pub spoken_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_close: Option<bool>,
}

impl Response {
    /// Create a response whose spoken text equals its description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            title: title.into(),
            spoken_text: description.clone(),
            description,
            auto_close: None,
        }
    }

    pub fn spoken(mut self, spoken_text: impl Into<String>) -> Self {
        self.spoken_text = spoken_text.into();
        self
    }

    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = Some(auto_close);
        self
    }
}

// ---------------------------------------------------------------------------
// Callback traits
// ---------------------------------------------------------------------------

/// Imperative route change.
pub trait NavigationHandler: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Push (or with `None`, clear) the current response.
pub trait ResponseHandler: Send + Sync {
    fn respond(&self, response: Option<&Response>);
}

/// Open a modal by id.
pub trait ModalHandler: Send + Sync {
    fn open_modal(&self, modal_id: &str);
}

impl<F> NavigationHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

impl<F> ResponseHandler for F
where
    F: Fn(Option<&Response>) + Send + Sync,
{
    fn respond(&self, response: Option<&Response>) {
        self(response)
    }
}

// `ModalHandler` has the same closure shape as `NavigationHandler`, so it is
// implemented for a wrapper instead of for every `Fn(&str)`.
/// Adapts a closure into a [`ModalHandler`].
pub struct ModalFn<F>(pub F);

impl<F> ModalHandler for ModalFn<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn open_modal(&self, modal_id: &str) {
        (self.0)(modal_id)
    }
}

// ---------------------------------------------------------------------------
// Async capabilities
// ---------------------------------------------------------------------------

/// Signals when a destination view has finished mounting.
///
/// Implementations simply resolve when ready; the session bounds the wait
/// with its configured timeout.
#[async_trait]
pub trait NavigationReadiness: Send + Sync {
    async fn wait_until_ready(&self, path: &str);
}

/// Readiness that resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateReadiness;

#[async_trait]
impl NavigationReadiness for ImmediateReadiness {
    async fn wait_until_ready(&self, _path: &str) {}
}

/// Result of trying to start a walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalkthroughOutcome {
    pub success: bool,
    /// Response to show instead of the plain confirmation.
    pub response: Option<Response>,
}

/// Step-by-step on-screen walkthroughs.
#[async_trait]
pub trait WalkthroughEngine: Send + Sync {
    fn has_script(&self, script_id: &str) -> bool;

    async fn begin_script_walkthrough(&self, script_id: &str) -> WalkthroughOutcome;
}

/// The absent walkthrough engine: no scripts, every start fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWalkthrough;

#[async_trait]
impl WalkthroughEngine for NoWalkthrough {
    fn has_script(&self, _script_id: &str) -> bool {
        false
    }

    async fn begin_script_walkthrough(&self, _script_id: &str) -> WalkthroughOutcome {
        WalkthroughOutcome::default()
    }
}

// ---------------------------------------------------------------------------
// HostHandlers
// ---------------------------------------------------------------------------

/// The registered host callbacks.  Any of them may be missing; calls to a
/// missing callback are logged and skipped.
#[derive(Clone, Default)]
pub struct HostHandlers {
    pub(crate) navigation: Option<Arc<dyn NavigationHandler>>,
    pub(crate) response: Option<Arc<dyn ResponseHandler>>,
    pub(crate) modal: Option<Arc<dyn ModalHandler>>,
}

impl HostHandlers {
    pub(crate) fn navigate(&self, path: &str) {
        match &self.navigation {
            Some(handler) => {
                tracing::info!(route = %path, "navigating");
                handler.navigate(path);
            }
            None => tracing::warn!(route = %path, "no navigation handler registered; skipping"),
        }
    }

    pub(crate) fn respond(&self, response: Option<&Response>) {
        match &self.response {
            Some(handler) => handler.respond(response),
            None => tracing::warn!(
                title = response.map(|r| r.title.as_str()).unwrap_or(""),
                "no response handler registered; skipping"
            ),
        }
    }

    pub(crate) fn open_modal(&self, modal_id: &str) {
        match &self.modal {
            Some(handler) => handler.open_modal(modal_id),
            None => tracing::warn!(modal_id = %modal_id, "no modal handler registered; skipping"),
        }
    }
}

impl std::fmt::Debug for HostHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandlers")
            .field("navigation", &self.navigation.is_some())
            .field("response", &self.response.is_some())
            .field("modal", &self.modal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn response_spoken_text_defaults_to_description() {
        let response = Response::new("Pantry", "Opening Pantry.");
        assert_eq!(response.spoken_text, "Opening Pantry.");
        assert_eq!(response.auto_close, None);

        let response = response.spoken("Here is your pantry").auto_close(true);
        assert_eq!(response.description, "Opening Pantry.");
        assert_eq!(response.spoken_text, "Here is your pantry");
        assert_eq!(response.auto_close, Some(true));
    }

    #[test]
    fn closures_act_as_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let host = HostHandlers {
            navigation: Some(Arc::new(move |path: &str| {
                sink.lock().unwrap().push(path.to_string())
            })),
            response: None,
            modal: None,
        };

        host.navigate("/pantry");
        // Missing handlers are skipped, not fatal.
        host.open_modal("macro-goals");
        host.respond(None);

        assert_eq!(*seen.lock().unwrap(), vec!["/pantry".to_string()]);
    }

    #[tokio::test]
    async fn no_walkthrough_never_has_scripts() {
        let engine = NoWalkthrough;
        assert!(!engine.has_script("CRAVING_HUB"));
        let outcome = engine.begin_script_walkthrough("CRAVING_HUB").await;
        assert!(!outcome.success);
        assert!(outcome.response.is_none());
    }
}
