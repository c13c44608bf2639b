//! Router configuration.
//!
//! Loaded from TOML, with environment overrides applied on top:
//!
//! ```toml
//! navigation_ready_timeout_ms = 3000
//! cancel_phrases = ["cancel", "go back", "exit", "never mind"]
//! walkthrough_autoplay_flag = "walkthrough_autoplay"
//! catalog_path = "config/catalog.toml"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voxroute_kernel::Catalog;

use crate::error::{IntentError, Result};
use crate::session::DEFAULT_CANCEL_PHRASES;

/// Overrides `navigation_ready_timeout_ms`.
pub const ENV_NAV_TIMEOUT_MS: &str = "VOXROUTE_NAV_TIMEOUT_MS";
/// Overrides `catalog_path`.
pub const ENV_CATALOG: &str = "VOXROUTE_CATALOG";

/// Tunables of a [`RoutingSession`](crate::RoutingSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Upper bound on waiting for a destination view before a walkthrough.
    pub navigation_ready_timeout_ms: u64,
    /// Phrases that abandon a pending hub selection.
    pub cancel_phrases: Vec<String>,
    /// Persisted flag that gates companion walkthroughs; a missing flag
    /// counts as enabled.
    pub walkthrough_autoplay_flag: String,
    /// Catalog file replacing the built-in catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            navigation_ready_timeout_ms: 3000,
            cancel_phrases: DEFAULT_CANCEL_PHRASES.iter().map(|s| s.to_string()).collect(),
            walkthrough_autoplay_flag: "walkthrough_autoplay".into(),
            catalog_path: None,
        }
    }
}

impl RouterConfig {
    /// Parse a TOML document.  Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| IntentError::Config {
            reason: format!("failed to parse TOML config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = ?path, "configuration file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| IntentError::Config {
            reason: format!("failed to read config file: {e}"),
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = ?path, "configuration loaded from file");
        Ok(config)
    }

    /// Apply `VOXROUTE_*` environment overrides.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(ENV_NAV_TIMEOUT_MS) {
            self.navigation_ready_timeout_ms =
                value.trim().parse().map_err(|_| IntentError::Config {
                    reason: format!("{ENV_NAV_TIMEOUT_MS} must be a number of milliseconds, got `{value}`"),
                })?;
        }
        if let Ok(value) = std::env::var(ENV_CATALOG)
            && !value.trim().is_empty()
        {
            self.catalog_path = Some(PathBuf::from(value));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn navigation_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_ready_timeout_ms)
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::load(path)?),
            None => Ok(Catalog::builtin()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cancel_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(IntentError::Config {
                reason: "at least one cancel phrase is required".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.navigation_ready_timeout(), Duration::from_secs(3));
        assert_eq!(config.cancel_phrases.len(), 4);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.catalog().unwrap(), Catalog::builtin());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RouterConfig::from_toml_str("navigation_ready_timeout_ms = 500").unwrap();
        assert_eq!(config.navigation_ready_timeout_ms, 500);
        assert_eq!(config.walkthrough_autoplay_flag, "walkthrough_autoplay");
    }

    #[test]
    fn empty_cancel_phrases_rejected() {
        let result = RouterConfig::from_toml_str("cancel_phrases = []");
        assert!(matches!(result, Err(IntentError::Config { .. })));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RouterConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn catalog_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.toml");
        std::fs::write(
            &catalog_path,
            r#"
[[direct_pages]]
id = "PANTRY"
primary_route = "/pantry"
keywords = ["pantry"]
"#,
        )
        .unwrap();
        let config_path = dir.path().join("voxroute.toml");
        std::fs::write(
            &config_path,
            format!("catalog_path = {:?}\n", catalog_path.display().to_string()),
        )
        .unwrap();

        let config = RouterConfig::load(&config_path).unwrap();
        let catalog = config.catalog().unwrap();
        assert!(catalog.hubs.is_empty());
        assert_eq!(catalog.direct_pages[0].id, "PANTRY");
    }
}
