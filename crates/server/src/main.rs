//! Tokapu maintenance binary.
//!
//! Loads configuration, connects to the database and runs one command:
//! `migrate` applies pending schema migrations, `reconcile` recounts the
//! engagement counters of the given artworks from their relation rows.

use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokapu_common::Config;
use tokapu_core::CounterSync;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tokapu maintenance commands.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file; defaults to `config/default.toml` plus `TOKAPU_ENV`.
    #[arg(long, env = "TOKAPU_CONFIG")]
    config: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Recount reaction, favorite and comment counters for artworks.
    Reconcile {
        /// Artwork IDs.
        #[arg(required = true)]
        artwork_ids: Vec<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tokapu=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let db = tokapu_db::init(&config)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    match cli.command {
        Command::Migrate => {
            tokapu_db::migrate(&db)
                .await
                .context("failed to run migrations")?;
        }
        Command::Reconcile { artwork_ids } => {
            let counters = CounterSync::new(Arc::new(db));
            let mut drifted = 0usize;

            for artwork_id in &artwork_ids {
                let result = counters
                    .reconcile(artwork_id)
                    .await
                    .with_context(|| format!("failed to reconcile artwork {artwork_id}"))?;
                if result.drifted() {
                    drifted += 1;
                }
                println!("{}", serde_json::to_string(&result)?);
            }

            info!(checked = artwork_ids.len(), drifted, "Reconcile finished");
        }
    }

    Ok(())
}
