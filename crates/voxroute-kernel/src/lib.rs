//! voxroute matching kernel.
//!
//! Pure, synchronous building blocks for resolving a spoken or typed phrase
//! to an application feature:
//!
//! - **[`text`]** -- normalization and tokenization of utterances.
//! - **[`matcher`]** -- the fuzzy keyword [`MatchPolicy`] (substring, then
//!   token overlap).
//! - **[`catalog`]** -- hubs, direct pages and legacy mappings, with
//!   TOML/JSON loading and validation.  [`Catalog::builtin`] ships the app's
//!   own features.
//! - **[`registry`]** -- hub-first feature discovery and sub-option lookup.
//! - **[`legacy`]** -- the flat legacy keyword map.
//! - **[`router`]** -- literal (aho-corasick) and regex phrase routing.
//! - **[`error`]** -- [`KernelError`] via [`thiserror`].
//!
//! Lookups never fail: they return `Option`/`bool` and leave the decision
//! about the next tier to the caller.

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod legacy;
pub mod matcher;
pub mod registry;
pub mod router;
pub mod text;

pub use catalog::{Catalog, FeatureDefinition, HubSize, LegacyMapping, SubOption};
pub use error::{KernelError, Result};
pub use legacy::LegacyKeywordMap;
pub use matcher::{MatchPolicy, SubstringTokenPolicy};
pub use registry::{FeatureRegistry, find_sub_option_by_alias, hub_requires_sub_selection};
pub use router::{PhraseMatch, PhraseRouter};
