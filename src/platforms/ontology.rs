//! Ontology explorer API.
//!
//! Ontology has two native assets: ONT, the indivisible governance coin, and
//! ONG, the gas token with 9 decimals. Fees are always paid in ONG.

use crate::coin::{self, Coin};
use crate::models::{self, AssetFilter, Meta, NativeTokenTransfer, Status, Transfer, TX_PER_PAGE};
use crate::platforms::client::HttpClient;
use crate::platforms::{merge_legs, registered_coin, ChainPlatform, FetchClient, Normalizer, TransferLeg};
use crate::utils::error::AtlasResult;
use crate::utils::numbers::to_smallest_unit;
use async_trait::async_trait;
use serde::Deserialize;

pub const ONT_ASSET: &str = "ont";
pub const ONG_ASSET: &str = "ong";

const ONG_NAME: &str = "Ontology Gas";
const ONG_SYMBOL: &str = "ONG";
const ONG_DECIMALS: u32 = 9;

const CONFIRMED: i64 = 1;

#[derive(Debug, Deserialize)]
pub struct TxPage {
    #[serde(rename = "Result")]
    pub result: TxList,
}

#[derive(Debug, Default, Deserialize)]
pub struct TxList {
    #[serde(rename = "TxnList", default)]
    pub txn_list: Vec<TxRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxRecord {
    pub txn_hash: String,
    #[serde(default)]
    pub confirm_flag: i64,
    #[serde(default)]
    pub txn_type: i64,
    #[serde(default)]
    pub txn_time: i64,
    #[serde(default)]
    pub height: u64,
    #[serde(default = "zero_amount")]
    pub fee: String,
    #[serde(default)]
    pub block_index: i64,
    #[serde(default)]
    pub transfer_list: Vec<TransferRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferRecord {
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub to_address: String,
    #[serde(default = "zero_amount")]
    pub amount: String,
    #[serde(default)]
    pub asset_name: String,
}

fn zero_amount() -> String {
    "0".to_string()
}

/// Which of the two native assets a filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Asset {
    Ont,
    Ong,
}

impl Asset {
    fn from_filter(filter: &AssetFilter) -> Option<Self> {
        match filter.as_str() {
            ONT_ASSET => Some(Asset::Ont),
            ONG_ASSET => Some(Asset::Ong),
            _ => None,
        }
    }

    fn decimals(self, coin: &Coin) -> u32 {
        match self {
            Asset::Ont => coin.decimals,
            Asset::Ong => ONG_DECIMALS,
        }
    }

    fn meta(self, leg: &TransferLeg) -> Meta {
        let value = leg.amount.to_string();
        match self {
            Asset::Ont => Meta::Transfer(Transfer { value }),
            Asset::Ong => Meta::NativeTokenTransfer(NativeTokenTransfer {
                name: ONG_NAME.to_string(),
                symbol: ONG_SYMBOL.to_string(),
                token_id: ONG_ASSET.to_string(),
                decimals: ONG_DECIMALS,
                value,
                from: leg.from.clone(),
                to: leg.to.clone(),
            }),
        }
    }
}

pub struct Ontology {
    coin: &'static Coin,
}

impl Ontology {
    pub fn new() -> AtlasResult<Self> {
        Ok(Ontology {
            coin: registered_coin(coin::ONT)?,
        })
    }
}

fn status(confirm_flag: i64) -> Status {
    if confirm_flag == CONFIRMED {
        Status::Completed
    } else {
        Status::Failed
    }
}

impl Normalizer for Ontology {
    type Record = TxRecord;

    fn coin(&self) -> &'static Coin {
        self.coin
    }

    fn decode_page(&self, raw: &[u8]) -> AtlasResult<Vec<TxRecord>> {
        let page: TxPage = serde_json::from_slice(raw)?;
        Ok(page.result.txn_list)
    }

    fn record_id<'a>(&self, record: &'a TxRecord) -> &'a str {
        &record.txn_hash
    }

    fn normalize(&self, record: &TxRecord, filter: &AssetFilter) -> AtlasResult<Vec<models::Tx>> {
        let asset = match Asset::from_filter(filter) {
            Some(asset) => asset,
            None => return Ok(Vec::new()),
        };

        let decimals = asset.decimals(self.coin);
        let legs = record
            .transfer_list
            .iter()
            .filter(|t| filter.matches(&t.asset_name))
            .map(|t| {
                Ok(TransferLeg {
                    from: t.from_address.clone(),
                    to: t.to_address.clone(),
                    amount: to_smallest_unit("Amount", &t.amount, decimals)?,
                })
            })
            .collect::<AtlasResult<Vec<_>>>()?;
        if legs.is_empty() {
            return Ok(Vec::new());
        }

        let status = status(record.confirm_flag);
        let fee = to_smallest_unit("Fee", &record.fee, ONG_DECIMALS)?.to_string();

        Ok(merge_legs(legs)
            .iter()
            .map(|leg| models::Tx {
                id: record.txn_hash.clone(),
                coin: self.coin.index,
                from: leg.from.clone(),
                to: leg.to.clone(),
                fee: fee.clone(),
                date: record.txn_time,
                block: record.height,
                status,
                meta: asset.meta(leg),
            })
            .collect())
    }
}

pub struct OntologyClient {
    http: HttpClient,
}

impl OntologyClient {
    pub fn new(http: HttpClient) -> Self {
        OntologyClient { http }
    }
}

#[async_trait]
impl FetchClient for OntologyClient {
    async fn get_txs_of_address(&self, address: &str) -> AtlasResult<Vec<u8>> {
        let path = format!("address/{}/ALL/{}/1", address, TX_PER_PAGE);
        self.http.get(&path, &[]).await
    }
}

pub fn platform(http: HttpClient) -> AtlasResult<ChainPlatform<Ontology>> {
    Ok(ChainPlatform::new(
        Ontology::new()?,
        Box::new(OntologyClient::new(http)),
    ))
}
