//! Terminal host for a routing session.
//!
//! The CLI has no views to navigate, so every host callback is recorded as
//! a [`HostEvent`] and printed after the utterance has been routed.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use voxroute_intent::{ModalFn, Response, RoutingSessionBuilder};

/// One thing the session asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Navigate { path: String },
    Respond { response: Option<Response> },
    OpenModal { modal_id: String },
}

impl HostEvent {
    /// Human-readable rendering for the terminal.
    pub fn render(&self) -> String {
        match self {
            Self::Navigate { path } => format!("  -> navigate {path}"),
            Self::OpenModal { modal_id } => format!("  -> open modal {modal_id}"),
            Self::Respond { response: None } => "  (response cleared)".to_string(),
            Self::Respond {
                response: Some(response),
            } => {
                let mut out = format!("  [{}] {}", response.title, response.description);
                if response.spoken_text != response.description {
                    out.push_str(&format!("\n    says: {}", response.spoken_text));
                }
                out
            }
        }
    }
}

/// Shared event log wired into a session's host callbacks.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register navigation, response and modal callbacks on `builder`.
    pub fn attach(&self, builder: RoutingSessionBuilder) -> RoutingSessionBuilder {
        let nav = self.clone();
        let resp = self.clone();
        let modal = self.clone();
        builder
            .navigation_handler(move |path: &str| {
                nav.push(HostEvent::Navigate {
                    path: path.to_string(),
                })
            })
            .response_handler(move |response: Option<&Response>| {
                resp.push(HostEvent::Respond {
                    response: response.cloned(),
                })
            })
            .modal_handler(ModalFn(move |modal_id: &str| {
                modal.push(HostEvent::OpenModal {
                    modal_id: modal_id.to_string(),
                })
            }))
    }

    /// Take every event recorded since the last drain.
    pub fn drain(&self) -> Vec<HostEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, event: HostEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
