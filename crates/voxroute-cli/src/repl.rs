//! Subcommand: `voxroute repl` -- interactive routing session.
//!
//! Every line is routed as an utterance through one long-lived session, so
//! hub selections and feature context carry over between lines.  Lines
//! starting with `:` are REPL commands; plain `exit` is routed like any
//! other utterance because it is a hub cancel phrase.

use std::io::{self, Write as _};

use anyhow::Result;
use tracing::{info, warn};
use voxroute_intent::RoutingSession;

use crate::helpers::parse_feature;
use crate::host::Transcript;

/// Run the interactive loop until EOF or `:quit`.
pub async fn cmd_repl(session: RoutingSession, transcript: Transcript) -> Result<()> {
    println!();
    println!("  voxroute v{}", env!("CARGO_PKG_VERSION"));
    println!("  Say something, or type :help.");
    println!();

    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        let prompt = match session.current_hub().await {
            Some(hub) => format!("[{}] > ", hub.display_name()),
            None => "> ".to_string(),
        };
        print!("{prompt}");
        io::stdout().flush().ok();

        line_buf.clear();
        match stdin.read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(command) = trimmed.strip_prefix(':') {
            if !run_repl_command(&session, command).await {
                break;
            }
            continue;
        }

        match session.handle_voice_query(trimmed).await {
            Ok(outcome) => {
                for event in transcript.drain() {
                    println!("{}", event.render());
                }
                info!(outcome = ?outcome, "utterance routed");
            }
            Err(e) => {
                transcript.drain();
                warn!(error = %e, "utterance failed");
                eprintln!("  Error: {e}");
            }
        }
    }

    info!("shutting down");
    Ok(())
}

/// Handle a `:command`.  Returns `false` when the loop should stop.
async fn run_repl_command(session: &RoutingSession, command: &str) -> bool {
    let (name, arg) = command
        .split_once(' ')
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    match name {
        "quit" | "q" => return false,
        "help" => {
            println!("  :enter <feature>  mark a feature as active (e.g. shopping-list)");
            println!("  :hub              show the pending hub and its timeout message");
            println!("  :clear            abandon the pending hub");
            println!("  :quit             leave the REPL");
        }
        "enter" => match parse_feature(arg) {
            Ok(feature) => {
                session.enter_feature(feature).await;
                println!("  active feature: {feature}");
            }
            Err(e) => eprintln!("  Error: {e}"),
        },
        "hub" => match session.current_hub().await {
            Some(hub) => {
                println!("  pending hub: {}", hub.id);
                if let Some(message) = session.hub_timeout_message().await {
                    println!("  on timeout: {message}");
                }
            }
            None => println!("  no pending hub"),
        },
        "clear" => {
            session.clear_hub().await;
            println!("  hub cleared");
        }
        other => eprintln!("  Unknown command `:{other}`. Try :help."),
    }
    true
}
