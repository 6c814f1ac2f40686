use crate::coin::{self, Coin};
use crate::models::{self, AssetFilter, Meta, Status, Transfer, TX_PER_PAGE};
use crate::platforms::client::HttpClient;
use crate::platforms::{registered_coin, ChainPlatform, FetchClient, Normalizer};
use crate::utils::error::AtlasResult;
use crate::utils::numbers::to_smallest_unit;
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::Number;

#[derive(Debug, Deserialize)]
pub struct TxPage {
    #[serde(default)]
    pub content: Vec<TxRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub transaction_hash: String,
    #[serde(default)]
    pub from_addr: String,
    #[serde(default)]
    pub to_addr: String,
    /// Display units, e.g. `1.5` AION. Kept as the literal JSON text
    /// (`arbitrary_precision`), never rounded through `f64`.
    #[serde(default)]
    pub value: Option<Number>,
    #[serde(default)]
    pub nrg_consumed: u64,
    #[serde(default)]
    pub nrg_price: u64,
    #[serde(default)]
    pub block_number: u64,
    /// Milliseconds.
    #[serde(default)]
    pub transaction_timestamp: i64,
    #[serde(default)]
    pub tx_error: String,
}

pub struct Aion {
    coin: &'static Coin,
}

impl Aion {
    pub fn new() -> AtlasResult<Self> {
        Ok(Aion {
            coin: registered_coin(coin::AION)?,
        })
    }
}

fn address(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("0x") {
        raw.to_string()
    } else {
        format!("0x{}", raw)
    }
}

impl Normalizer for Aion {
    type Record = TxRecord;

    fn coin(&self) -> &'static Coin {
        self.coin
    }

    fn decode_page(&self, raw: &[u8]) -> AtlasResult<Vec<TxRecord>> {
        let page: TxPage = serde_json::from_slice(raw)?;
        Ok(page.content)
    }

    fn record_id<'a>(&self, record: &'a TxRecord) -> &'a str {
        &record.transaction_hash
    }

    fn normalize(&self, record: &TxRecord, asset: &AssetFilter) -> AtlasResult<Vec<models::Tx>> {
        if !asset.matches(self.coin.symbol) {
            return Ok(Vec::new());
        }

        let status = if record.tx_error.trim().is_empty() {
            Status::Completed
        } else {
            Status::Failed
        };
        let fee = BigUint::from(record.nrg_consumed) * BigUint::from(record.nrg_price);
        let value = match &record.value {
            Some(number) => to_smallest_unit("value", &number.to_string(), self.coin.decimals)?,
            None => BigUint::default(),
        };

        Ok(vec![models::Tx {
            id: record.transaction_hash.clone(),
            coin: self.coin.index,
            from: address(&record.from_addr),
            to: address(&record.to_addr),
            fee: fee.to_string(),
            date: record.transaction_timestamp / 1000,
            block: record.block_number,
            status,
            meta: Meta::Transfer(Transfer {
                value: value.to_string(),
            }),
        }])
    }
}

pub struct AionClient {
    http: HttpClient,
}

impl AionClient {
    pub fn new(http: HttpClient) -> Self {
        AionClient { http }
    }
}

#[async_trait]
impl FetchClient for AionClient {
    async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
        let query = [
            ("accountAddress", address.to_string()),
            ("size", TX_PER_PAGE.to_string()),
        ];
        self.http.get("getTransactionsByAddress", &query).await
    }
}

pub fn platform(http: HttpClient) -> AtlasResult<ChainPlatform<Aion>> {
    Ok(ChainPlatform::new(Aion::new()?, Box::new(AionClient::new(http))))
}
