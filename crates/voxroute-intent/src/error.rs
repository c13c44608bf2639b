//! Intent engine error types.
//!
//! Only programmer errors surface here: a bad action shape, an unregistered
//! command id, a failing command handler or broken configuration.  Nothing a
//! user can say produces an [`IntentError`]; unmatched utterances always end
//! in a fallback response instead.

/// Unified error type for the intent engine.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Command errors ------------------------------------------------------
    /// No command with this id is registered in the command table.
    #[error("unknown command: {id}")]
    UnknownCommand { id: String },

    /// A command id was registered twice.
    #[error("command already registered: {id}")]
    DuplicateCommand { id: String },

    /// An action is missing a required field or could not be decoded.
    #[error("malformed {kind} action: {reason}")]
    MalformedAction { kind: String, reason: String },

    /// A command handler reported a failure.
    #[error("command `{id}` failed: {reason}")]
    CommandFailed { id: String, reason: String },

    // -- Navigation ----------------------------------------------------------
    /// The destination view did not report ready within the timeout.
    #[error("navigation to {path} not ready after {timeout_ms} ms")]
    NavigationTimeout { path: String, timeout_ms: u64 },

    // -- Configuration -------------------------------------------------------
    /// The router configuration could not be read or is invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the kernel crate.
    #[error("kernel error: {0}")]
    Kernel(#[from] voxroute_kernel::KernelError),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
