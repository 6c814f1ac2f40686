//! Chain-agnostic transaction model shared by every platform.
//!
//! A [`Tx`] never stores its type separately from its metadata: the `type`
//! tag is produced by the [`Meta`] variant, so a transfer can not carry token
//! fields and a token transfer can not lose them.

use serde::Serialize;

/// Number of transactions fetch clients request per page.
pub const TX_PER_PAGE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tx {
    pub id: String,
    pub coin: u32,
    pub from: String,
    pub to: String,
    /// Smallest unit of the chain's fee currency, integer string.
    pub fee: String,
    /// Unix seconds.
    pub date: i64,
    pub block: u64,
    pub status: Status,
    #[serde(flatten)]
    pub meta: Meta,
}

impl Tx {
    pub fn tx_type(&self) -> TxType {
        self.meta.tx_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Transfer,
    NativeTokenTransfer,
    ContractCall,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "meta", rename_all = "snake_case")]
pub enum Meta {
    Transfer(Transfer),
    NativeTokenTransfer(NativeTokenTransfer),
    ContractCall(ContractCall),
    Unsupported,
}

impl Meta {
    pub fn tx_type(&self) -> TxType {
        match self {
            Meta::Transfer(_) => TxType::Transfer,
            Meta::NativeTokenTransfer(_) => TxType::NativeTokenTransfer,
            Meta::ContractCall(_) => TxType::ContractCall,
            Meta::Unsupported => TxType::Unsupported,
        }
    }

    /// Amount moved by the transaction, if the variant carries one.
    pub fn value(&self) -> Option<&str> {
        match self {
            Meta::Transfer(t) => Some(t.value.as_str()),
            Meta::NativeTokenTransfer(t) => Some(t.value.as_str()),
            Meta::ContractCall(c) => Some(c.value.as_str()),
            Meta::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub value: String,
}

/// Movement of a secondary native asset, e.g. a gas token that lives next
/// to the chain's primary coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeTokenTransfer {
    pub name: String,
    pub symbol: String,
    pub token_id: String,
    pub decimals: u32,
    pub value: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    pub input: String,
    pub value: String,
}

/// Asset a caller asked about. Comparison ignores case and surrounding
/// whitespace, since explorers disagree on how to spell the same asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetFilter(String);

impl AssetFilter {
    pub fn new(asset: &str) -> Self {
        AssetFilter(normalize_asset(asset))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, asset: &str) -> bool {
        self.0 == normalize_asset(asset)
    }
}

fn normalize_asset(asset: &str) -> String {
    asset.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_tx() -> Tx {
        Tx {
            id: "abc".to_string(),
            coin: 1024,
            from: "A".to_string(),
            to: "B".to_string(),
            fee: "10000000".to_string(),
            date: 1556952450,
            block: 3411115,
            status: Status::Completed,
            meta: Meta::Transfer(Transfer {
                value: "2".to_string(),
            }),
        }
    }

    #[test]
    fn test_transfer_serializes_type_next_to_meta() {
        let value = serde_json::to_value(transfer_tx()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "abc",
                "coin": 1024,
                "from": "A",
                "to": "B",
                "fee": "10000000",
                "date": 1556952450,
                "block": 3411115,
                "status": "completed",
                "type": "transfer",
                "meta": { "value": "2" }
            })
        );
    }

    #[test]
    fn test_native_token_transfer_field_names() {
        let mut tx = transfer_tx();
        tx.meta = Meta::NativeTokenTransfer(NativeTokenTransfer {
            name: "Ontology Gas".to_string(),
            symbol: "ONG".to_string(),
            token_id: "ong".to_string(),
            decimals: 9,
            value: "10".to_string(),
            from: "A".to_string(),
            to: "B".to_string(),
        });
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "native_token_transfer");
        assert_eq!(value["meta"]["token_id"], "ong");
        assert_eq!(value["meta"]["decimals"], 9);
        assert_eq!(tx.tx_type(), TxType::NativeTokenTransfer);
    }

    #[test]
    fn test_unsupported_has_no_meta() {
        let mut tx = transfer_tx();
        tx.meta = Meta::Unsupported;
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "unsupported");
        assert!(value.get("meta").is_none());
        assert_eq!(tx.meta.value(), None);
    }

    #[test]
    fn test_asset_filter_normalizes_both_sides() {
        let filter = AssetFilter::new(" ONT ");
        assert_eq!(filter.as_str(), "ont");
        assert!(filter.matches("ont"));
        assert!(filter.matches("Ont"));
        assert!(!filter.matches("ong"));
    }
}
