//! FLIPSCOUT — Albion Online Black Market flip scanner
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the upstream price client into the scan engine, and serves
//! the API + dashboard until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use flipscout::config::AppConfig;
use flipscout::engine::scanner::FlipScanner;
use flipscout::market::client::AlbionDataClient;
use flipscout::market::PriceSource;
use flipscout::names::ItemNameService;
use flipscout::server;
use flipscout::server::routes::ServerState;
use flipscout::storage::HiddenItemStore;

const BANNER: &str = r#"
 _____ _     ___ ____  ____   ____ ___  _   _ _____
|  ___| |   |_ _|  _ \/ ___| / ___/ _ \| | | |_   _|
| |_  | |    | || |_) \___ \| |  | | | | | | | | |
|  _| | |___ | ||  __/ ___) | |__| |_| | |_| | | |
|_|   |_____|___|_|   |____/ \____\___/ \___/  |_|

  Black Market flip scanner
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let config = Arc::new(AppConfig::load("config.toml")?);

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");
    info!(
        port = config.server.port,
        upstream = %config.market_data.base_url,
        cities = config.scan.cities.len(),
        categories = config.categories.len(),
        "FLIPSCOUT starting up"
    );

    // -- Wire components --------------------------------------------------

    let source: Arc<dyn PriceSource> = Arc::new(AlbionDataClient::new(
        &config.market_data.base_url,
        config.market_data.request_timeout_secs,
    )?);

    let scanner = FlipScanner::new(Arc::clone(&source), Arc::clone(&config));
    let names = ItemNameService::new(&config.items.name_db_url)?;
    let hidden = HiddenItemStore::open(&config.storage.hidden_items_file)?;

    let state = Arc::new(ServerState {
        scanner,
        names,
        hidden,
        source,
        config: Arc::clone(&config),
    });

    // -- Serve -------------------------------------------------------------

    server::serve(state, config.server.port).await?;
    info!("FLIPSCOUT shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flipscout=info"));

    let json_logging = std::env::var("FLIPSCOUT_LOG_JSON").is_ok();

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
