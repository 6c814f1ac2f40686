//! Supported chains and their native currency metadata.
//!
//! The registry is built once on first access and is read-only afterwards.
//! Platforms borrow `&'static Coin` entries from it.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// SLIP-44 indexes of the supported chains.
pub const TRX: u32 = 195;
pub const AION: u32 = 425;
pub const ONT: u32 = 1024;
pub const BSC: u32 = 20000714;

/// Native currency of a blockchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub index: u32,
    pub symbol: &'static str,
    #[serde(rename = "name")]
    pub title: &'static str,
    #[serde(rename = "link")]
    pub website: &'static str,
    pub decimals: u32,
}

const COIN_TABLE: &[Coin] = &[
    Coin {
        index: TRX,
        symbol: "TRX",
        title: "Tron",
        website: "https://tron.network",
        decimals: 6,
    },
    Coin {
        index: AION,
        symbol: "AION",
        title: "Aion",
        website: "https://aion.network",
        decimals: 18,
    },
    Coin {
        index: ONT,
        symbol: "ONT",
        title: "Ontology",
        website: "https://ont.io",
        decimals: 0,
    },
    Coin {
        index: BSC,
        symbol: "BNB",
        title: "Smart Chain",
        website: "https://www.binance.org/en/smartChain",
        decimals: 18,
    },
];

pub static COINS: Lazy<CoinRegistry> = Lazy::new(|| CoinRegistry::from_table(COIN_TABLE));

#[derive(Debug)]
pub struct CoinRegistry {
    coins: BTreeMap<u32, Coin>,
}

impl CoinRegistry {
    fn from_table(table: &[Coin]) -> Self {
        CoinRegistry {
            coins: table.iter().map(|c| (c.index, *c)).collect(),
        }
    }

    pub fn get(&self, index: u32) -> Option<&Coin> {
        self.coins.get(&index)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Coin> {
        self.coins
            .values()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.values()
    }
}

/// Looks up a coin in the process-wide registry.
pub fn coin(index: u32) -> Option<&'static Coin> {
    COINS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_by_index_and_symbol() {
        let ont = coin(ONT).unwrap();
        assert_eq!(ont.symbol, "ONT");
        assert_eq!(ont.decimals, 0);
        assert_eq!(COINS.by_symbol("bnb").unwrap().index, BSC);
        assert!(coin(1).is_none());
    }

    #[test]
    fn test_registry_is_ordered_by_index() {
        let indexes: Vec<u32> = COINS.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![TRX, AION, ONT, BSC]);
    }

    #[test]
    fn test_coin_serializes_with_public_field_names() {
        let value = serde_json::to_value(coin(AION).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "index": 425,
                "symbol": "AION",
                "name": "Aion",
                "link": "https://aion.network",
                "decimals": 18
            })
        );
    }
}
