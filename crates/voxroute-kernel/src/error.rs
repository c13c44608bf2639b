//! Kernel error types.
//!
//! Lookup and matching never fail; errors only surface while building the
//! catalog or the phrase router, i.e. for configuration mistakes rather than
//! for anything a user might say.

/// Unified error type for the voxroute kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    // -- Catalog errors -----------------------------------------------------
    /// The catalog violates one of its structural invariants.
    #[error("invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// The catalog source could not be read or deserialized.
    #[error("failed to parse catalog: {reason}")]
    CatalogParse { reason: String },

    // -- Router errors ------------------------------------------------------
    /// Building the literal automaton failed.
    #[error("router build error: {reason}")]
    RouterBuildError { reason: String },

    /// A regex pattern supplied to the router is invalid.
    #[error("invalid regex pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, KernelError>;
