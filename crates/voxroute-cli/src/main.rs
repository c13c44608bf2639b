//! CLI entry point for voxroute.
//!
//! This binary provides the `voxroute` command with subcommands for routing
//! utterances, running an interactive session and inspecting the catalog.

mod cli;
mod helpers;
mod host;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Instrument, info_span};
use voxroute_intent::{RouterConfig, get_hub_prompt_message};
use voxroute_kernel::Catalog;

use crate::cli::{CatalogAction, Cli, Commands};
use crate::helpers::{build_session, init_tracing, load_config, parse_feature};
use crate::host::Transcript;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Route {
            utterances,
            feature,
            json,
        } => cmd_route(config, utterances, feature, json).await,
        Commands::Repl => {
            let transcript = Transcript::new();
            let session = build_session(config, &transcript)?;
            let span = info_span!("repl", session_id = %session.id());
            repl::cmd_repl(session, transcript).instrument(span).await
        }
        Commands::Catalog { action } => cmd_catalog(config, action),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: route
// ---------------------------------------------------------------------------

async fn cmd_route(
    config: RouterConfig,
    utterances: Vec<String>,
    feature: Option<String>,
    json: bool,
) -> Result<()> {
    let transcript = Transcript::new();
    let session = build_session(config, &transcript)?;

    if let Some(name) = feature {
        session.enter_feature(parse_feature(&name)?).await;
    }

    for utterance in &utterances {
        let outcome = session
            .handle_voice_query(utterance)
            .await
            .with_context(|| format!("failed to route {utterance:?}"))?;
        let events = transcript.drain();

        if json {
            let line = serde_json::json!({
                "utterance": utterance,
                "outcome": outcome,
                "events": events,
            });
            println!("{line}");
        } else {
            println!("> {utterance}");
            for event in &events {
                println!("{}", event.render());
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: catalog
// ---------------------------------------------------------------------------

fn cmd_catalog(config: RouterConfig, action: CatalogAction) -> Result<()> {
    match action {
        CatalogAction::List => {
            let catalog = config.catalog().context("failed to load catalog")?;
            print_catalog(&catalog);
        }
        CatalogAction::Check { path } => {
            let catalog = Catalog::load(&path)
                .with_context(|| format!("catalog {} is invalid", path.display()))?;
            println!(
                "  OK: {} hubs, {} direct pages, {} legacy mappings",
                catalog.hubs.len(),
                catalog.direct_pages.len(),
                catalog.legacy.len()
            );
        }
        CatalogAction::Dump => {
            let catalog = config.catalog().context("failed to load catalog")?;
            let json = serde_json::to_string_pretty(&catalog).context("failed to encode catalog")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!();
    println!("  Hubs");
    println!("  ====");
    for hub in &catalog.hubs {
        println!("  {:<20} {:<28} {}", hub.id, hub.primary_route, hub.keywords.join(", "));
        println!("    prompt: {}", get_hub_prompt_message(hub));
        for option in &hub.sub_options {
            println!(
                "    - {:<16} {:<28} {}",
                option.id,
                option.route,
                option.aliases.join(", ")
            );
        }
    }

    println!();
    println!("  Direct pages");
    println!("  ============");
    for page in &catalog.direct_pages {
        println!("  {:<20} {:<28} {}", page.id, page.primary_route, page.keywords.join(", "));
    }

    println!();
    println!("  Legacy");
    println!("  ======");
    for mapping in &catalog.legacy {
        println!("  {:<49} {}", mapping.path, mapping.keywords.join(", "));
    }
    println!();
}
