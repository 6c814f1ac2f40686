use crate::coin::{self, Coin};
use crate::models::{self, AssetFilter, ContractCall, Meta, Status, Transfer, TX_PER_PAGE};
use crate::platforms::client::HttpClient;
use crate::platforms::{merge_legs, registered_coin, ChainPlatform, FetchClient, Normalizer, TransferLeg};
use crate::utils::error::{AppError, AtlasResult};
use crate::utils::numbers::parse_quantity;
use crate::utils::tron::display_address;
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::Value;

const TRANSFER_CONTRACT: &str = "TransferContract";
const TRIGGER_SMART_CONTRACT: &str = "TriggerSmartContract";
const SUCCESS: &str = "SUCCESS";

#[derive(Debug, Deserialize)]
pub struct TxPage {
    #[serde(default)]
    pub data: Vec<TxRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxRecord {
    #[serde(rename = "txID")]
    pub tx_id: String,
    #[serde(rename = "blockNumber", default)]
    pub block_number: u64,
    /// Milliseconds.
    #[serde(default)]
    pub block_timestamp: i64,
    #[serde(default)]
    pub ret: Vec<TxResult>,
    #[serde(default)]
    pub raw_data: RawData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxResult {
    #[serde(rename = "contractRet", default)]
    pub contract_ret: String,
    #[serde(default)]
    pub fee: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawData {
    #[serde(default)]
    pub contract: Vec<Contract>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contract {
    #[serde(rename = "type", default)]
    pub contract_type: String,
    #[serde(default)]
    pub parameter: Parameter,
}

/// `value` differs per contract type, so it stays untyped until normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub value: Value,
}

impl Parameter {
    fn address(&self, key: &str) -> String {
        self.value
            .get(key)
            .and_then(|a| a.as_str())
            .map(display_address)
            .unwrap_or_default()
    }

    fn amount(&self, key: &'static str) -> AtlasResult<BigUint> {
        match self.value.get(key) {
            None | Some(Value::Null) => Ok(BigUint::default()),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(BigUint::from)
                .ok_or_else(|| AppError::malformed(key, n.to_string())),
            Some(Value::String(s)) => parse_quantity(key, s),
            Some(other) => Err(AppError::malformed(key, other.to_string())),
        }
    }
}

pub struct Tron {
    coin: &'static Coin,
}

impl Tron {
    pub fn new() -> AtlasResult<Self> {
        Ok(Tron {
            coin: registered_coin(coin::TRX)?,
        })
    }

    fn tx(&self, record: &TxRecord, status: Status, fee: &str, from: String, to: String, meta: Meta) -> models::Tx {
        models::Tx {
            id: record.tx_id.clone(),
            coin: self.coin.index,
            from,
            to,
            fee: fee.to_string(),
            date: record.block_timestamp / 1000,
            block: record.block_number,
            status,
            meta,
        }
    }
}

/// A transaction without a result has not been included in a block yet.
fn status(ret: &[TxResult]) -> Status {
    match ret.first() {
        None => Status::Pending,
        Some(r) if r.contract_ret == SUCCESS => Status::Completed,
        Some(_) => Status::Failed,
    }
}

impl Normalizer for Tron {
    type Record = TxRecord;

    fn coin(&self) -> &'static Coin {
        self.coin
    }

    fn decode_page(&self, raw: &[u8]) -> AtlasResult<Vec<TxRecord>> {
        let page: TxPage = serde_json::from_slice(raw)?;
        Ok(page.data)
    }

    fn record_id<'a>(&self, record: &'a TxRecord) -> &'a str {
        &record.tx_id
    }

    /// Transfers come first (merged per sender/receiver pair), followed by
    /// contract calls and unsupported contracts in record order.
    fn normalize(&self, record: &TxRecord, asset: &AssetFilter) -> AtlasResult<Vec<models::Tx>> {
        if !asset.matches(self.coin.symbol) {
            return Ok(Vec::new());
        }

        let status = status(&record.ret);
        let fee = record
            .ret
            .iter()
            .map(|r| BigUint::from(r.fee))
            .sum::<BigUint>()
            .to_string();

        let mut legs = Vec::new();
        let mut others = Vec::new();
        for contract in &record.raw_data.contract {
            let parameter = &contract.parameter;
            let from = parameter.address("owner_address");
            match contract.contract_type.as_str() {
                TRANSFER_CONTRACT => legs.push(TransferLeg {
                    from,
                    to: parameter.address("to_address"),
                    amount: parameter.amount("amount")?,
                }),
                TRIGGER_SMART_CONTRACT => {
                    let input = parameter
                        .value
                        .get("data")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let meta = Meta::ContractCall(ContractCall {
                        input,
                        value: parameter.amount("call_value")?.to_string(),
                    });
                    others.push((from, parameter.address("contract_address"), meta));
                }
                _ => others.push((from, parameter.address("to_address"), Meta::Unsupported)),
            }
        }

        let mut txs: Vec<models::Tx> = merge_legs(legs)
            .into_iter()
            .map(|leg| {
                let meta = Meta::Transfer(Transfer {
                    value: leg.amount.to_string(),
                });
                self.tx(record, status, &fee, leg.from, leg.to, meta)
            })
            .collect();
        txs.extend(
            others
                .into_iter()
                .map(|(from, to, meta)| self.tx(record, status, &fee, from, to, meta)),
        );

        Ok(txs)
    }
}

pub struct TronClient {
    http: HttpClient,
}

impl TronClient {
    pub fn new(http: HttpClient) -> Self {
        TronClient { http }
    }
}

#[async_trait]
impl FetchClient for TronClient {
    async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
        let path = format!("v1/accounts/{}/transactions", address);
        self.http
            .get(&path, &[("limit", TX_PER_PAGE.to_string())])
            .await
    }
}

pub fn platform(http: HttpClient, api_key: Option<String>) -> AtlasResult<ChainPlatform<Tron>> {
    let http = match api_key {
        Some(key) => http.with_header("TRON-PRO-API-KEY", &key)?,
        None => http,
    };
    Ok(ChainPlatform::new(Tron::new()?, Box::new(TronClient::new(http))))
}
