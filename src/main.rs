//! Odds aggregator entry point.
//!
//! Loads configuration, initialises structured logging, wires the upstream
//! client, cache and aggregator together and serves the HTTP API until
//! Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use odds_aggregator::config;
use odds_aggregator::engine::aggregator::Aggregator;
use odds_aggregator::engine::cache::{CacheSettings, SportCache};
use odds_aggregator::engine::policy::BookmakerPolicy;
use odds_aggregator::provider::the_odds_api::OddsApiClient;
use odds_aggregator::server::{self, ServerState};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = if std::path::Path::new(CONFIG_PATH).exists() {
        config::AppConfig::load(CONFIG_PATH)?
    } else {
        info!(path = CONFIG_PATH, "No config file found, using defaults");
        config::AppConfig::parse("")?
    };

    let api_key = cfg.api_key()?;
    let client = OddsApiClient::new(&cfg.provider.base_url, api_key, cfg.provider.request_timeout())?;

    let policy = BookmakerPolicy::from_config(&cfg.bookmakers);
    let settings = CacheSettings::from_config(&cfg);

    info!(
        primary_region = %settings.primary_region,
        secondary_region = %settings.secondary_region,
        ttl_secs = settings.ttl.as_secs(),
        bookmakers = cfg.bookmakers.allowed.len(),
        max_per_match = policy.max_per_match(),
        default_sport = %cfg.server.default_sport,
        "Odds aggregator starting up"
    );

    let cache = Arc::new(SportCache::new(Arc::new(client), policy, settings));
    let state = Arc::new(ServerState::new(
        Aggregator::new(cache),
        cfg.server.default_sport.clone(),
    ));

    server::serve(state, cfg.server.port, shutdown_signal()).await?;

    info!("Odds aggregator shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("odds_aggregator=info,tower_http=info"));

    let json_logging = std::env::var("ODDS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
