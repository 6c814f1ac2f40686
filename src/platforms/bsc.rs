use crate::coin::{self, Coin};
use crate::models::{self, AssetFilter, ContractCall, Meta, Status, Transfer, TX_PER_PAGE};
use crate::platforms::client::HttpClient;
use crate::platforms::{registered_coin, ChainPlatform, FetchClient, Normalizer};
use crate::utils::error::{AppError, AtlasResult};
use crate::utils::numbers::{parse_quantity, parse_u64};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const NO_TRANSACTIONS: &str = "No transactions found";

/// Explorer envelope. `result` is an array on success and a message string
/// on failure, so it is inspected before being decoded into records.
#[derive(Debug, Deserialize)]
pub struct TxPage {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

/// Every numeric field arrives as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub hash: String,
    #[serde(default = "zero")]
    pub block_number: String,
    #[serde(default = "zero")]
    pub time_stamp: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default = "zero")]
    pub value: String,
    #[serde(default = "zero")]
    pub gas_price: String,
    #[serde(default = "zero")]
    pub gas_used: String,
    #[serde(default)]
    pub is_error: String,
    #[serde(rename = "txreceipt_status", default)]
    pub txreceipt_status: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub confirmations: String,
}

fn zero() -> String {
    "0".to_string()
}

pub struct SmartChain {
    coin: &'static Coin,
}

impl SmartChain {
    pub fn new() -> AtlasResult<Self> {
        Ok(SmartChain {
            coin: registered_coin(coin::BSC)?,
        })
    }
}

fn status(record: &TxRecord) -> Status {
    if record.confirmations == "0" {
        return Status::Pending;
    }
    match (record.is_error.as_str(), record.txreceipt_status.as_str()) {
        ("0", "1") | ("0", "") => Status::Completed,
        _ => Status::Failed,
    }
}

fn is_plain_transfer(input: &str) -> bool {
    input.is_empty() || input == "0x"
}

impl Normalizer for SmartChain {
    type Record = TxRecord;

    fn coin(&self) -> &'static Coin {
        self.coin
    }

    fn decode_page(&self, raw: &[u8]) -> AtlasResult<Vec<TxRecord>> {
        let page: TxPage = serde_json::from_slice(raw)?;
        match page.result {
            Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
            Value::Null => Ok(Vec::new()),
            _ if page.message.starts_with(NO_TRANSACTIONS) => Ok(Vec::new()),
            other => Err(AppError::DecodeError(format!(
                "status {}: {} {}",
                page.status, page.message, other
            ))),
        }
    }

    fn record_id<'a>(&self, record: &'a TxRecord) -> &'a str {
        &record.hash
    }

    fn normalize(&self, record: &TxRecord, asset: &AssetFilter) -> AtlasResult<Vec<models::Tx>> {
        if !asset.matches(self.coin.symbol) {
            return Ok(Vec::new());
        }

        let status = status(record);
        let fee = parse_quantity("gasUsed", &record.gas_used)?
            * parse_quantity("gasPrice", &record.gas_price)?;
        let value = parse_quantity("value", &record.value)?.to_string();
        let block = parse_u64("blockNumber", &record.block_number)?;
        let date = parse_u64("timeStamp", &record.time_stamp)?;
        let date = i64::try_from(date).map_err(|_| AppError::malformed("timeStamp", &record.time_stamp))?;

        let to = if record.to.is_empty() {
            record.contract_address.clone()
        } else {
            record.to.clone()
        };
        let meta = if is_plain_transfer(&record.input) {
            Meta::Transfer(Transfer { value })
        } else {
            Meta::ContractCall(ContractCall {
                input: record.input.clone(),
                value,
            })
        };

        Ok(vec![models::Tx {
            id: record.hash.clone(),
            coin: self.coin.index,
            from: record.from.clone(),
            to,
            fee: fee.to_string(),
            date,
            block,
            status,
            meta,
        }])
    }
}

pub struct SmartChainClient {
    http: HttpClient,
    api_key: Option<String>,
}

impl SmartChainClient {
    pub fn new(http: HttpClient, api_key: Option<String>) -> Self {
        SmartChainClient { http, api_key }
    }
}

#[async_trait]
impl FetchClient for SmartChainClient {
    async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
        let mut query = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("page", "1".to_string()),
            ("offset", TX_PER_PAGE.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        self.http.get("", &query).await
    }
}

pub fn platform(http: HttpClient, api_key: Option<String>) -> AtlasResult<ChainPlatform<SmartChain>> {
    Ok(ChainPlatform::new(
        SmartChain::new()?,
        Box::new(SmartChainClient::new(http, api_key)),
    ))
}
