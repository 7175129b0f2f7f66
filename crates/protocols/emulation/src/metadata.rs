//! Token metadata lookups
//!
//! Symbols and decimals are resolved by an external collaborator and handed
//! in through [`TokenMetadata`]. [`MetadataCache`] is the in-memory
//! implementation callers fill as lookups complete; entries live for the
//! lifetime of the cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use swapbench_core::constants::{NATIVE_DECIMALS, NATIVE_SYMBOL};

use crate::asset::AssetId;

/// Symbol rendered when metadata is unavailable
pub const UNKNOWN_SYMBOL: &str = "UNKWN";

/// Decimals recorded when a metadata response omits them (the jetton default)
pub const DEFAULT_DECIMALS: u8 = NATIVE_DECIMALS;

/// Symbol and decimals of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    pub fn native() -> Self {
        Self::new(NATIVE_SYMBOL, NATIVE_DECIMALS)
    }
}

/// Source of per-asset presentation metadata
pub trait TokenMetadata {
    fn symbol(&self, asset: &AssetId) -> Option<String>;

    fn decimals(&self, asset: &AssetId) -> Option<u8>;

    /// Symbol with the `UNKWN` fallback
    fn symbol_or_unknown(&self, asset: &AssetId) -> String {
        self.symbol(asset).unwrap_or_else(|| {
            tracing::debug!("No symbol for {}, using {}", asset, UNKNOWN_SYMBOL);
            UNKNOWN_SYMBOL.to_string()
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    entries: HashMap<AssetId, TokenInfo>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: AssetId, info: TokenInfo) {
        if asset.is_native() {
            return;
        }
        self.entries.insert(asset, info);
    }

    pub fn get(&self, asset: &AssetId) -> Option<TokenInfo> {
        match asset {
            AssetId::Native => Some(TokenInfo::native()),
            token => self.entries.get(token).cloned(),
        }
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        asset.is_native() || self.entries.contains_key(asset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ingest a metadata index response:
    ///
    /// ```text
    /// { "0:ADDR": { "token_info": [ { "symbol": "USDT", "extra": { "decimals": "6" } } ] } }
    /// ```
    ///
    /// Returns the number of entries added. Entries with unparseable keys
    /// are skipped; missing fields fall back to `UNKWN`/9.
    pub fn ingest_metadata_response(&mut self, json: &serde_json::Value) -> usize {
        let Some(map) = json.as_object() else {
            tracing::warn!("Metadata response is not an object");
            return 0;
        };

        let mut added = 0;
        for (key, entry) in map {
            let asset = match AssetId::normalize(key) {
                Ok(asset) => asset,
                Err(e) => {
                    tracing::warn!("Skipping metadata for {}: {}", key, e);
                    continue;
                }
            };
            let info = &entry["token_info"][0];
            let symbol = info["symbol"]
                .as_str()
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_SYMBOL);
            let decimals = parse_decimals(&info["extra"]["decimals"]).unwrap_or(DEFAULT_DECIMALS);
            self.insert(asset, TokenInfo::new(symbol, decimals));
            added += 1;
        }

        tracing::debug!("Cached metadata for {} assets ({} total)", added, self.len());
        added
    }
}

fn parse_decimals(value: &serde_json::Value) -> Option<u8> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|d| u8::try_from(d).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TokenMetadata for MetadataCache {
    fn symbol(&self, asset: &AssetId) -> Option<String> {
        self.get(asset).map(|info| info.symbol)
    }

    fn decimals(&self, asset: &AssetId) -> Option<u8> {
        self.get(asset).map(|info| info.decimals)
    }
}
