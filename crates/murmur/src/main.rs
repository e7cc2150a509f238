// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Murmur - batch email drafting with a live typing preview.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod credits;
mod draft;
mod input;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use murmur_config::{ConfigError, MurmurConfig};
use murmur_core::DraftingMode;

/// Murmur - batch email drafting with a live typing preview.
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Draft emails for a set of contacts and watch them being typed out.
    Draft(draft::DraftArgs),
    /// Inspect or change the stored credit balance.
    Credits {
        #[command(subcommand)]
        action: CreditsAction,
    },
    /// Manage Murmur configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum CreditsAction {
    /// Print the stored balance.
    Show,
    /// Overwrite the stored balance.
    Set { balance: f64 },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load and validate configuration, reporting every problem found.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> Result<MurmurConfig, Vec<ConfigError>> {
    match path {
        Some(path) => murmur_config::load_and_validate_path(path),
        None => murmur_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            murmur_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Draft(args)) => {
            init_tracing(&config.agent.log_level);
            draft::run_draft(config, args).await
        }
        Some(Commands::Credits { action }) => match action {
            CreditsAction::Show => credits::show(&config).await,
            CreditsAction::Set { balance } => credits::set(&config, balance).await,
        },
        Some(Commands::Config {
            action: ConfigAction::Check,
        }) => {
            println!(
                "murmur: config ok (agent.name={}, models={})",
                config.agent.name,
                config.models.rotation.len()
            );
            Ok(())
        }
        None => {
            println!("murmur: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Parse `--mode` values (`ai`, `hybrid`, `handwritten`).
fn parse_mode(value: &str) -> Result<DraftingMode, String> {
    value
        .parse::<DraftingMode>()
        .map_err(|_| format!("unknown drafting mode `{value}` (expected ai, hybrid or handwritten)"))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("murmur={log_level},warn")));

    // Stdout belongs to the preview.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn draft_arguments_parse() {
        let cli = Cli::try_parse_from([
            "murmur",
            "draft",
            "--contacts",
            "contacts.json",
            "--settings",
            "settings.json",
            "--identity",
            "me.json",
            "--mode",
            "hybrid",
            "--select",
            "3,1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Draft(args)) => {
                assert_eq!(args.mode, DraftingMode::Hybrid);
                assert_eq!(args.select, vec![3, 1]);
                assert!(!args.no_preview);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = parse_mode("robot").unwrap_err();
        assert!(err.contains("expected ai, hybrid or handwritten"));
        assert_eq!(parse_mode("ai").unwrap(), DraftingMode::Ai);
    }

    #[test]
    fn credits_set_takes_a_balance() {
        let cli = Cli::try_parse_from(["murmur", "credits", "set", "12.5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Credits {
                action: CreditsAction::Set { balance }
            }) if balance == 12.5
        ));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = murmur_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "murmur");
    }
}
