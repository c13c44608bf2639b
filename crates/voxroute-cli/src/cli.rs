//! CLI argument definitions for voxroute.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// voxroute -- voice intent routing for a hub-based app.
#[derive(Parser)]
#[command(
    name = "voxroute",
    version,
    about = "voxroute -- voice intent routing",
    long_about = "Resolves spoken or typed phrases to app features through literal phrases, \
                  hub sessions, an alias registry, legacy keywords and a command fallback."
)]
pub struct Cli {
    /// Router configuration file (TOML).  A missing file means defaults.
    #[arg(long, short, global = true, default_value = "config/voxroute.toml")]
    pub config: PathBuf,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route one or more utterances through a fresh session and print what
    /// the host was asked to do.
    Route {
        /// Utterances, processed in order within the same session.
        #[arg(required = true)]
        utterances: Vec<String>,

        /// Mark a feature as active before routing (e.g. `shopping-list`).
        #[arg(long)]
        feature: Option<String>,

        /// Print each outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: type utterances, `:enter <feature>`, `:hub`,
    /// `:clear` or `:quit`.
    Repl,

    /// Inspect the feature catalog.
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

/// Actions for inspecting the catalog.
#[derive(Subcommand)]
pub enum CatalogAction {
    /// List hubs, direct pages and legacy mappings in priority order.
    List,
    /// Validate a catalog file (TOML or JSON).
    Check {
        /// The catalog file to check.
        path: PathBuf,
    },
    /// Print the effective catalog as JSON.
    Dump,
}
