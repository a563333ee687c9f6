//! Betfair Value Bot — Entry Point
//!
//! One invocation scans the configured competitions once and places at
//! most one bet, then exits.
//!
//! Wiring sequence:
//! 1. Load `.env`, then the config file + validate. An explicit
//!    VALUE_BOT_CONFIG must exist; only the implicit config.toml may be
//!    absent, in which case the defaults apply
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Load Betfair credentials from env vars
//! 4. Load probability estimates and the team-name lookup
//! 5. Certificate login (session owns the temp cert directory)
//! 6. Create the bet object store (local directory or S3)
//! 7. Run the selector inside a run-id span
//! 8. Print the run report as JSON on stdout

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use betfair_value_bot::adapters::api::{BetfairClient, Credentials};
use betfair_value_bot::adapters::data::{load_probabilities, load_selection_lookup};
use betfair_value_bot::adapters::persistence::BetObjectStore;
use betfair_value_bot::config::loader::ConfigSource;
use betfair_value_bot::config::{self, AppConfig};
use betfair_value_bot::domain::SelectionLookup;
use betfair_value_bot::usecases::{BetSelector, EstimateIndex};

const CONFIG_ENV: &str = "VALUE_BOT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ── 1. Environment and configuration ────────────────────
    let dotenv = dotenvy::dotenv();
    let explicit_path = std::env::var(CONFIG_ENV).ok();
    let (config, source) =
        config::loader::resolve_config(explicit_path.as_deref(), DEFAULT_CONFIG_PATH)
            .context("Failed to load configuration")?;

    // ── 2. Structured JSON logging (stdout is the report) ───
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults => warn!(
            path = DEFAULT_CONFIG_PATH,
            dry_run = config.bot.dry_run,
            "No config file found, running on built-in defaults"
        ),
    }

    let run_id = Uuid::new_v4();
    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        %run_id,
        dry_run = config.bot.dry_run,
        "Starting Betfair value bot"
    );

    run(config)
        .instrument(info_span!("run", %run_id))
        .await
}

async fn run(config: AppConfig) -> Result<()> {
    // ── 3. Credentials from env vars ────────────────────────
    let credentials =
        Credentials::from_env().context("Failed to load Betfair credentials from env")?;

    // ── 4. Input datasets ───────────────────────────────────
    let estimates = load_probabilities(&config.data.probabilities_path)
        .context("Failed to load probability estimates")?;
    let lookup = match &config.data.selections_path {
        Some(path) => load_selection_lookup(path).context("Failed to load selection lookup")?,
        None => SelectionLookup::new(),
    };
    let index = EstimateIndex::build(&estimates, &lookup);
    if index.is_empty() {
        warn!("No usable probability estimates, nothing can be matched");
    }

    // ── 5. Authenticated exchange session ───────────────────
    let exchange = Arc::new(
        BetfairClient::authenticate(&config.api, &credentials)
            .await
            .context("Failed to authenticate with Betfair")?,
    );

    // ── 6. Placed-bet store ─────────────────────────────────
    let store = Arc::new(
        BetObjectStore::from_config(&config.persistence)
            .await
            .context("Failed to open bet store")?,
    );

    // ── 7. One selection run ────────────────────────────────
    let selector = BetSelector::new(exchange, store, &config)?;
    let report = selector.run(&index).await?;

    info!(
        markets_scanned = report.markets_scanned,
        candidates = report.candidates,
        eligible = report.eligible,
        placed = report.placed.is_some(),
        "Run complete"
    );

    // ── 8. Run report on stdout ─────────────────────────────
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
    println!("{json}");
    Ok(())
}
