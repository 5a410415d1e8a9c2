use std::sync::Arc;

use tracing::{error, info};

use mapwatch::{
    gateway, ApiSender, CatalogFetcher, Config, Poller, SubscriptionStore, WatermarkStore,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = mapwatch::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        mapwatch::logging::init_console_only(&config.logging.level);
    }

    info!("mapwatch - ranked beatmap notifier");

    let subscriptions = match SubscriptionStore::open(&config.storage.data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open subscription store: {e}");
            std::process::exit(1);
        }
    };
    let watermark = match WatermarkStore::open(&config.storage.data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open watermark store: {e}");
            std::process::exit(1);
        }
    };

    let fetcher = match CatalogFetcher::new(&config.listing) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Failed to create catalog fetcher: {e}");
            std::process::exit(1);
        }
    };
    let sender = match ApiSender::new(&config.api) {
        Ok(sender) => sender,
        Err(e) => {
            eprintln!("Failed to create API sender: {e}");
            std::process::exit(1);
        }
    };

    // Command gateway runs beside the poll loop.
    let gateway_subscriptions = subscriptions.clone();
    let gateway_config = config.gateway.clone();
    tokio::spawn(async move {
        if let Err(e) = gateway::serve(
            &gateway_config.host,
            gateway_config.port,
            gateway_subscriptions,
        )
        .await
        {
            error!("gateway terminated: {e}");
        }
    });

    let poller = Poller::new(fetcher, sender, subscriptions, watermark)
        .with_interval(config.listing.poll_interval_secs)
        .with_window(config.listing.window_minutes);
    poller.run().await;
}
