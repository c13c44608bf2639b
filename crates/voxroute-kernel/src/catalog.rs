//! Feature catalog -- the routing configuration data.
//!
//! A [`Catalog`] holds three ordered lists:
//!
//! - **hubs** -- features that own several sub-destinations and need one
//!   extra turn to pick one of them,
//! - **direct pages** -- features with a single destination,
//! - **legacy mappings** -- flat keyword lists for features not yet migrated
//!   into the hub/direct-page model.
//!
//! Order inside each list is priority: when two features match the same
//! utterance, the one declared first wins.  The lists are plain `Vec`s so
//! that priority is visible in the data itself.
//!
//! Catalogs can be built in code, taken from [`Catalog::builtin`], or loaded
//! from TOML/JSON:
//!
//! ```toml
//! [[hubs]]
//! id = "CRAVING_HUB"
//! primary_route = "/craving-creator-landing"
//! keywords = ["craving"]
//!
//! [[hubs.sub_options]]
//! id = "CRAVING_CREATOR"
//! label = "Craving Creator"
//! route = "/craving-creator"
//! aliases = ["creator"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Prompt-style hint for hubs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubSize {
    /// Few options; the prompt enumerates them.
    #[default]
    Small,
    /// Many options; the prompt asks an open question instead of listing.
    Large,
}

/// One selectable child of a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOption {
    /// Unique within the parent hub.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Destination path.
    pub route: String,
    /// Trigger phrases, only evaluated while the parent hub's session is
    /// active.  Not required to be disjoint across siblings.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Optional spoken confirmation used when this option is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

/// One discoverable destination: either a hub or a direct page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    /// Unique, stable key (e.g. `CRAVING_HUB`).
    pub id: String,
    /// Older identifier kept for compatibility; also used as the walkthrough
    /// script id when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    /// Destination path.
    pub primary_route: String,
    #[serde(default)]
    pub is_hub: bool,
    #[serde(default)]
    pub hub_size: HubSize,
    /// Ordered trigger phrases.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Present iff `is_hub`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_options: Vec<SubOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_timeout_message: Option<String>,
    /// Static explanation of the feature, spoken when the destination view
    /// does not become ready in time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FeatureDefinition {
    /// Create a direct page.
    pub fn page(
        id: impl Into<String>,
        primary_route: impl Into<String>,
        keywords: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            legacy_id: None,
            primary_route: primary_route.into(),
            is_hub: false,
            hub_size: HubSize::Small,
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            sub_options: Vec::new(),
            spoken_prompt: None,
            selection_prompt: None,
            voice_timeout_message: None,
            description: None,
        }
    }

    /// Create a hub with the given sub-options.
    pub fn hub(
        id: impl Into<String>,
        primary_route: impl Into<String>,
        keywords: &[&str],
        sub_options: Vec<SubOption>,
    ) -> Self {
        Self {
            is_hub: true,
            sub_options,
            ..Self::page(id, primary_route, keywords)
        }
    }

    pub fn with_legacy_id(mut self, legacy_id: impl Into<String>) -> Self {
        self.legacy_id = Some(legacy_id.into());
        self
    }

    pub fn with_hub_size(mut self, size: HubSize) -> Self {
        self.hub_size = size;
        self
    }

    pub fn with_selection_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.selection_prompt = Some(prompt.into());
        self
    }

    pub fn with_spoken_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.spoken_prompt = Some(prompt.into());
        self
    }

    pub fn with_voice_timeout_message(mut self, message: impl Into<String>) -> Self {
        self.voice_timeout_message = Some(message.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Identifier used to look up a companion walkthrough script.
    pub fn walkthrough_id(&self) -> &str {
        self.legacy_id.as_deref().unwrap_or(&self.id)
    }

    /// Human-readable name derived from the id: `MEAL_PLANNING_HUB` becomes
    /// `Meal Planning`, `SHOPPING_LIST` becomes `Shopping List`.
    pub fn display_name(&self) -> String {
        let base = self.id.strip_suffix("_HUB").unwrap_or(&self.id);
        base.split('_')
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SubOption {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        route: impl Into<String>,
        aliases: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            route: route.into(),
            aliases: aliases.iter().map(|a| (*a).to_owned()).collect(),
            narration: None,
        }
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }
}

/// A flat keyword mapping retained for features not yet in the hub model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMapping {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walkthrough_id: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl LegacyMapping {
    pub fn new(path: impl Into<String>, walkthrough_id: Option<&str>, keywords: &[&str]) -> Self {
        Self {
            path: path.into(),
            walkthrough_id: walkthrough_id.map(str::to_owned),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The complete, ordered routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub hubs: Vec<FeatureDefinition>,
    #[serde(default)]
    pub direct_pages: Vec<FeatureDefinition>,
    #[serde(default)]
    pub legacy: Vec<LegacyMapping>,
}

impl Catalog {
    /// Assemble and validate a catalog from its three lists.
    ///
    /// Entries passed as hubs are marked `is_hub`.
    pub fn new(
        hubs: Vec<FeatureDefinition>,
        direct_pages: Vec<FeatureDefinition>,
        legacy: Vec<LegacyMapping>,
    ) -> Result<Self> {
        let mut catalog = Self {
            hubs,
            direct_pages,
            legacy,
        };
        catalog.mark_hubs();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a TOML catalog and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut catalog: Self = toml::from_str(source).map_err(|e| KernelError::CatalogParse {
            reason: e.to_string(),
        })?;
        catalog.mark_hubs();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a JSON catalog and validate it.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let mut catalog: Self =
            serde_json::from_str(source).map_err(|e| KernelError::CatalogParse {
                reason: e.to_string(),
            })?;
        catalog.mark_hubs();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file; `.json` files are read as JSON, anything else as
    /// TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KernelError::CatalogParse {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let catalog = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        tracing::info!(
            path = %path.display(),
            hubs = catalog.hubs.len(),
            direct_pages = catalog.direct_pages.len(),
            legacy = catalog.legacy.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Check the structural invariants:
    ///
    /// - feature ids are unique across hubs and direct pages,
    /// - every hub has at least one sub-option, with ids unique in the hub,
    /// - no direct page declares itself a hub or carries sub-options.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for feature in self.hubs.iter().chain(&self.direct_pages) {
            if !seen.insert(feature.id.as_str()) {
                return Err(invalid(format!("duplicate feature id `{}`", feature.id)));
            }
        }

        for hub in &self.hubs {
            if hub.sub_options.is_empty() {
                return Err(invalid(format!("hub `{}` has no sub-options", hub.id)));
            }
            let mut option_ids = HashSet::new();
            for option in &hub.sub_options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(invalid(format!(
                        "duplicate sub-option id `{}` in hub `{}`",
                        option.id, hub.id
                    )));
                }
            }
        }

        for page in &self.direct_pages {
            if page.is_hub || !page.sub_options.is_empty() {
                return Err(invalid(format!(
                    "direct page `{}` must not be a hub or carry sub-options",
                    page.id
                )));
            }
        }

        Ok(())
    }

    /// Look up a hub or direct page by id (or legacy id).
    pub fn feature(&self, id: &str) -> Option<&FeatureDefinition> {
        self.hubs
            .iter()
            .chain(&self.direct_pages)
            .find(|f| f.id == id || f.legacy_id.as_deref() == Some(id))
    }

    fn mark_hubs(&mut self) {
        for hub in &mut self.hubs {
            hub.is_hub = true;
        }
    }
}

fn invalid(reason: String) -> KernelError {
    KernelError::InvalidCatalog { reason }
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
