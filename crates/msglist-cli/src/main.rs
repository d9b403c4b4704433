//! msglist CLI
//!
//! Thin wrapper around msglist-core for command-line usage. All results are
//! printed to stdout as JSON; logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Replay an operation script and print the final list
//! msglist replay script.json
//!
//! # Print the list after every operation
//! msglist replay script.json --steps
//!
//! # Normalize a JSON array of drafts at a fixed time
//! msglist normalize drafts.json --now 1700000000000
//!
//! # Drop duplicate ids from a JSON array of messages
//! msglist dedup messages.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use msglist_core::{
    uniq_by_id, ChatPayload, ManualTimeSource, Message, MessageDraft, MessageListStore, Script,
    SequentialIdGenerator, StoreConfig,
};
use tracing::{debug, info};

/// msglist - chat message list toolkit
#[derive(Parser)]
#[command(name = "msglist")]
#[command(version = "0.1.0")]
#[command(about = "Replay and inspect chat message-list operations")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Store config file (default: <config dir>/msglist/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an operation script against a fresh store
    Replay {
        /// Path to the script JSON
        script: PathBuf,

        /// Print the list after every operation instead of only the final list
        #[arg(long)]
        steps: bool,
    },

    /// Normalize a JSON array of message drafts
    Normalize {
        /// Path to the drafts JSON
        file: PathBuf,

        /// Current time in epoch millis (default: system time)
        #[arg(long)]
        now: Option<i64>,

        /// Generate ids as <prefix>-1, <prefix>-2, ... instead of ULIDs
        #[arg(long)]
        id_prefix: Option<String>,
    },

    /// Drop duplicate ids from a JSON array of messages, keeping the first
    Dedup {
        /// Path to the messages JSON
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay { script, steps } => {
            let parsed: Script<ChatPayload> = Script::from_json_file(&script)
                .with_context(|| format!("Failed to load script {}", script.display()))?;
            let report = parsed.run_with_config(&config)?;
            info!(
                steps = report.steps.len(),
                len = report.messages.len(),
                "Replay finished"
            );

            if steps {
                print_json(&report)?;
            } else {
                print_json(&report.messages)?;
            }
        }

        Commands::Normalize { file, now, id_prefix } => {
            let drafts: Vec<MessageDraft<ChatPayload>> = read_json(&file)?;

            let mut builder = MessageListStore::<ChatPayload>::builder().config(config);
            if let Some(now) = now {
                builder = builder.time_source(ManualTimeSource::new(now));
            }
            if let Some(prefix) = id_prefix {
                if prefix.is_empty() {
                    bail!("--id-prefix must not be empty");
                }
                builder = builder.id_generator(SequentialIdGenerator::new(prefix));
            }
            let mut store = builder.build();

            let normalized: Vec<Message<ChatPayload>> =
                drafts.into_iter().map(|d| store.normalize(d)).collect();
            debug!(len = normalized.len(), "Normalized drafts");
            print_json(&normalized)?;
        }

        Commands::Dedup { file } => {
            let messages: Vec<Message<ChatPayload>> = read_json(&file)?;
            let before = messages.len();
            let unique = uniq_by_id(messages);
            info!(before, after = unique.len(), "Deduplicated");
            print_json(&unique)?;
        }
    }

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit path, else the per-user config file if it exists, else defaults
fn load_config(explicit: Option<&Path>) -> Result<StoreConfig> {
    if let Some(path) = explicit {
        return StoreConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "Using user config");
            StoreConfig::from_json_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        _ => Ok(StoreConfig::default()),
    }
}

/// Get the default config path (<config dir>/msglist/config.json)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("msglist").join("config.json"))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
