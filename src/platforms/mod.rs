pub mod aion;
pub mod bsc;
pub mod client;
pub mod ontology;
pub mod tron;

use crate::coin::{self, Coin};
use crate::models::{AssetFilter, Tx};
use crate::utils::config::{HttpConfig, PlatformsConfig};
use crate::utils::error::{AppError, AtlasResult};
use async_trait::async_trait;
use client::HttpClient;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Decoder and normalization engine of one chain.
///
/// Implementations are pure: no I/O and no shared mutable state, so they can
/// run on any thread for any number of records at once. `normalize` returns
/// an empty vector when the record does not concern the requested asset.
pub trait Normalizer: Send + Sync {
    type Record;

    fn coin(&self) -> &'static Coin;

    /// Parses one raw page. Fails only on syntax or a missing required field.
    fn decode_page(&self, raw: &[u8]) -> AtlasResult<Vec<Self::Record>>;

    fn record_id<'a>(&self, record: &'a Self::Record) -> &'a str;

    fn normalize(&self, record: &Self::Record, asset: &AssetFilter) -> AtlasResult<Vec<Tx>>;

    /// Decodes a page and normalizes every record in input order. A record
    /// with a malformed field is dropped and logged; its siblings are kept.
    fn normalize_page(&self, raw: &[u8], asset: &AssetFilter) -> AtlasResult<Vec<Tx>> {
        let records = self.decode_page(raw)?;
        let mut txs = Vec::with_capacity(records.len());

        for record in &records {
            match self.normalize(record, asset) {
                Ok(normalized) => txs.extend(normalized),
                Err(e) if e.is_record_level() => {
                    warn!(
                        coin = self.coin().symbol,
                        tx = self.record_id(record),
                        error = %e,
                        "Dropping record"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(txs)
    }
}

/// Fetches one raw page of transactions for an address.
///
/// Retries, rate limiting and pagination belong here, never in a
/// [`Normalizer`]. Errors are handed back unchanged.
#[async_trait]
pub trait FetchClient: Send + Sync {
    async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>>;
}

/// Object-safe view of a chain, selected by coin index at the serving boundary.
#[async_trait]
pub trait Platform: Send + Sync {
    fn coin(&self) -> &'static Coin;

    async fn get_txs_by_address(
        &self,
        address: &str,
        asset: &AssetFilter,
    ) -> AtlasResult<Vec<Tx>>;
}

pub struct ChainPlatform<N> {
    normalizer: N,
    client: Box<dyn FetchClient>,
}

impl<N: Normalizer> ChainPlatform<N> {
    pub fn new(normalizer: N, client: Box<dyn FetchClient>) -> Self {
        ChainPlatform { normalizer, client }
    }
}

#[async_trait]
impl<N: Normalizer + 'static> Platform for ChainPlatform<N> {
    fn coin(&self) -> &'static Coin {
        self.normalizer.coin()
    }

    async fn get_txs_by_address(
        &self,
        address: &str,
        asset: &AssetFilter,
    ) -> AtlasResult<Vec<Tx>> {
        let raw = self.client.get_txs_of_address(address).await?;
        let txs = self.normalizer.normalize_page(&raw, asset)?;
        debug!(
            coin = self.coin().symbol,
            address,
            asset = asset.as_str(),
            count = txs.len(),
            "Normalized page"
        );
        Ok(txs)
    }
}

/// Enabled platforms keyed by coin index. Built once at startup.
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: HashMap<u32, Box<dyn Platform>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, platform: Box<dyn Platform>) {
        self.platforms.insert(platform.coin().index, platform);
    }

    pub fn from_config(platforms: &PlatformsConfig, http: &HttpConfig) -> AtlasResult<Self> {
        let timeout = Duration::from_secs(http.timeout_seconds);
        let mut registry = Self::new();

        if platforms.ontology.enable {
            let client = HttpClient::new(&platforms.ontology.api_url, timeout)?;
            registry.register(Box::new(ontology::platform(client)?));
        }
        if platforms.aion.enable {
            let client = HttpClient::new(&platforms.aion.api_url, timeout)?;
            registry.register(Box::new(aion::platform(client)?));
        }
        if platforms.tron.enable {
            let client = HttpClient::new(&platforms.tron.api_url, timeout)?;
            registry.register(Box::new(tron::platform(client, platforms.tron.api_key.clone())?));
        }
        if platforms.bsc.enable {
            let client = HttpClient::new(&platforms.bsc.api_url, timeout)?;
            registry.register(Box::new(bsc::platform(client, platforms.bsc.api_key.clone())?));
        }

        for platform in registry.platforms.values() {
            info!("Platform enabled: {}", platform.coin().title);
        }

        Ok(registry)
    }

    pub fn get(&self, coin: u32) -> AtlasResult<&dyn Platform> {
        self.platforms
            .get(&coin)
            .map(|p| p.as_ref())
            .ok_or(AppError::UnknownCoin(coin))
    }

    pub fn coins(&self) -> Vec<&'static Coin> {
        let mut coins: Vec<&'static Coin> = self.platforms.values().map(|p| p.coin()).collect();
        coins.sort_by_key(|c| c.index);
        coins
    }
}

pub(crate) fn registered_coin(index: u32) -> AtlasResult<&'static Coin> {
    coin::coin(index).ok_or(AppError::UnknownCoin(index))
}

/// One asset movement inside a raw record, already scaled to smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferLeg {
    pub from: String,
    pub to: String,
    pub amount: BigUint,
}

/// Legs with the same `(from, to)` pair are one semantic transfer and are
/// summed. Distinct pairs stay separate. Output keeps first-seen order.
pub(crate) fn merge_legs(legs: Vec<TransferLeg>) -> Vec<TransferLeg> {
    let mut merged: Vec<TransferLeg> = Vec::with_capacity(legs.len());
    for leg in legs {
        match merged
            .iter_mut()
            .find(|m| m.from == leg.from && m.to == leg.to)
        {
            Some(existing) => existing.amount += leg.amount,
            None => merged.push(leg),
        }
    }
    merged
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Serves canned pages and records the addresses it was asked for.
    pub struct StaticFetchClient {
        pub response: Mutex<Option<AtlasResult<Vec<u8>>>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticFetchClient {
        pub fn ok(body: &str) -> Self {
            Self::with(Ok(body.as_bytes().to_vec()))
        }

        pub fn with(response: AtlasResult<Vec<u8>>) -> Self {
            StaticFetchClient {
                response: Mutex::new(Some(response)),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FetchClient for StaticFetchClient {
        async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
            self.requested.lock().unwrap().push(address.to_string());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AppError::NetworkError("no more pages".to_string())))
        }
    }

    #[async_trait]
    impl FetchClient for Arc<StaticFetchClient> {
        async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
            self.as_ref().get_txs_of_address(address).await
        }
    }
}
