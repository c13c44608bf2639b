//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, configuration loading and session
//! construction.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxroute_intent::{ActiveFeature, RouterConfig, RoutingSession};

use crate::host::Transcript;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Load the router configuration from `path` and apply `VOXROUTE_*`
/// environment overrides.
pub fn load_config(path: &Path) -> Result<RouterConfig> {
    let config = RouterConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?
        .apply_env()
        .context("invalid environment override")?;
    Ok(config)
}

/// Build a session over the configured catalog with `transcript` as host.
pub fn build_session(config: RouterConfig, transcript: &Transcript) -> Result<RoutingSession> {
    let catalog = config.catalog().context("failed to load catalog")?;
    let session = transcript
        .attach(RoutingSession::builder(catalog).config(config))
        .build()
        .context("failed to build routing session")?;
    info!(session_id = %session.id(), "session started");
    Ok(session)
}

/// Parse a feature name such as `shopping-list` or `Pantry`.
pub fn parse_feature(name: &str) -> Result<ActiveFeature> {
    name.parse::<ActiveFeature>().map_err(|e| {
        let known: Vec<&str> = ActiveFeature::ALL.iter().map(|f| f.as_str()).collect();
        anyhow::anyhow!("{e}; expected one of: {}", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("voxroute.toml")).unwrap();
        assert_eq!(config.navigation_ready_timeout_ms, 3000);
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxroute.toml");
        std::fs::write(&path, "navigation_ready_timeout_ms = \"soon\"").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn parse_feature_lists_known_names() {
        assert_eq!(parse_feature("shopping list").unwrap(), ActiveFeature::ShoppingList);
        let err = parse_feature("garage").unwrap_err().to_string();
        assert!(err.contains("pantry"));
    }
}
