use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use txatlas::models::{AssetFilter, Tx};
use txatlas::platforms::PlatformRegistry;
use txatlas::utils::config::{AppConfig, WatchConfig};
use txatlas::utils::error::AtlasResult;
use txatlas::utils::log::Logger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = AppConfig::new()?;
    let _guard = Logger::init(&config.log)?;

    info!("Logger initialized");
    info!("Starting transaction atlas...");

    let registry = PlatformRegistry::from_config(&config.platforms, &config.http)?;

    if config.watch.is_empty() {
        warn!("Watch list is empty, nothing to fetch");
        return Ok(());
    }

    let concurrency = config.scheduler.concurrency.max(1);
    loop {
        poll_watch_list(&registry, &config.watch, concurrency).await;

        if config.scheduler.interval_seconds == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_secs(config.scheduler.interval_seconds)).await;
    }

    Ok(())
}

/// Fetches every watch entry with at most `concurrency` requests in flight.
/// Results are reported in watch list order.
async fn poll_watch_list(registry: &PlatformRegistry, watch: &[WatchConfig], concurrency: usize) {
    let results: Vec<(&WatchConfig, AtlasResult<Vec<Tx>>)> = stream::iter(watch)
        .map(|entry| async move { (entry, fetch(registry, entry).await) })
        .buffered(concurrency)
        .collect()
        .await;

    for (entry, result) in results {
        match result {
            Ok(txs) => {
                info!(
                    "{} transactions for {} ({}) on coin {}",
                    txs.len(),
                    entry.address,
                    entry.asset,
                    entry.coin
                );
                match serde_json::to_string_pretty(&txs) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to serialize transactions: {}", e),
                }
            }
            Err(e) => {
                error!(
                    "Error fetching coin {} address {}: {}",
                    entry.coin, entry.address, e
                );
            }
        }
    }
}

#[instrument(skip(registry, entry), fields(coin = entry.coin, address = %entry.address))]
async fn fetch(registry: &PlatformRegistry, entry: &WatchConfig) -> AtlasResult<Vec<Tx>> {
    let platform = registry.get(entry.coin)?;
    platform
        .get_txs_by_address(&entry.address, &AssetFilter::new(&entry.asset))
        .await
}
