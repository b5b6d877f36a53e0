use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use rent_cli::app::{self, QuoteArgs};
use rent_cli::config::AppConfig;
use rent_cli::{document, logging};
use rent_core::calculations::PricingEngine;
use rent_core::history::HistoryStore;
use rent_core::session::QuoteSession;
use rent_core::QuoteError;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Rent-to-own vehicle quoting.
///
/// Prices a contract from the vehicle, client and suburb details, keeps a
/// rolling history of recent quotes and exports a summary document.
#[derive(Debug, Parser)]
#[command(name = "smartrent", version)]
struct Cli {
    /// Configuration file (defaults to `smartrent.toml` if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Storage connection string.
    /// For SQLite this is a file path (e.g. `smartrent.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Suburb directory file (.csv or .json).
    #[arg(long, global = true)]
    suburbs: Option<PathBuf>,

    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Lift the history limit for this run.
    #[arg(long, global = true, hide = true)]
    unlock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a new contract and record it in the history.
    Quote {
        #[command(flatten)]
        args: QuoteArgs,

        /// Export the result (.xlsx or .csv, or a directory).
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List recent calculations, newest first.
    History {
        /// Remove every calculation from the history.
        #[arg(long)]
        clear: bool,
    },

    /// Search the suburb directory.
    Suburbs {
        /// Part of a suburb name.
        query: String,
    },
}

impl Cli {
    /// Command-line flags take precedence over the configuration file.
    fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(backend) = &self.backend {
            config.storage.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            config.storage.connection_string = db.clone();
        }
        if let Some(path) = &self.suburbs {
            config.directory.path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    logging::init_logging(&config.logging.level, config.logging.file.as_deref())?;

    match cli.command {
        Command::Suburbs { ref query } => {
            let directory = rent_data::load_from_file(&config.directory.path)?;
            print!("{}", app::render_suburbs(&directory.search(query)));
            Ok(())
        }
        Command::History { clear } => {
            let store = open_store(&config).await?;
            let history = HistoryStore::new(store, config.history);
            if clear {
                history.clear().await?;
                println!("History cleared.");
            } else {
                print!("{}", app::render_history(&history.list_active().await?));
            }
            Ok(())
        }
        Command::Quote {
            ref args,
            ref export,
        } => {
            let directory = rent_data::load_from_file(&config.directory.path)?;
            let engine = PricingEngine::new(config.pricing.clone())?;
            let store = open_store(&config).await?;

            let mut session = QuoteSession::new(store, config.history, engine);
            if cli.unlock {
                session.unlock_admin();
            }

            let entry = match app::submit_quote(&mut session, &directory, args).await {
                Ok(entry) => entry,
                Err(err @ QuoteError::Validation(_)) => {
                    eprint!("{}", app::render_validation_errors(&err));
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            };

            println!("Calculation completed!\n");
            print!("{}", app::render_summary(&entry));

            // The quote is already recorded; a failed export only gets reported.
            if let Some(target) = export {
                match document::export_entry(&entry, target) {
                    Ok(path) => println!("\nExported to {}", path.display()),
                    Err(err) => {
                        error!(error = %err, "export failed");
                        eprintln!("\nFailed to export: {err}");
                    }
                }
            }
            Ok(())
        }
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn rent_core::KeyValueStore>> {
    debug!("connecting to {} backend", config.storage.backend);
    let store = app::build_registry()
        .create(&config.storage)
        .await
        .with_context(|| format!("Failed to open {} storage", config.storage.backend))?;
    info!(backend = %config.storage.backend, "storage ready");
    Ok(store)
}
