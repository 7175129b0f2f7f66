//! Asset identity normalization
//!
//! Aggregators, price feeds and the emulator spell the same asset
//! differently: user-friendly or raw addresses, upper or lower case hex,
//! `"ton"`/`"TON"`/`"native"` for the native coin. Everything is folded to
//! [`AssetId`] once, at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use swapbench_core::constants::NATIVE_SENTINEL;
use swapbench_core::AssessError;
use ton_tx::AccountAddress;

/// Spellings of the native coin accepted on input (case-insensitive)
const NATIVE_ALIASES: [&str; 2] = [NATIVE_SENTINEL, "native"];

/// Native coin or a jetton identified by its master contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetId {
    Native,
    Token(AccountAddress),
}

impl AssetId {
    /// Normalize a textual asset reference.
    pub fn normalize(asset_ref: &str) -> Result<Self, AssessError> {
        let trimmed = asset_ref.trim();
        if NATIVE_ALIASES
            .iter()
            .any(|alias| trimmed.eq_ignore_ascii_case(alias))
        {
            return Ok(Self::Native);
        }
        parse_account(trimmed).map(Self::Token)
    }

    /// Normalize the asset of a DEX transfer record.
    ///
    /// A transfer with no asset, or with either jetton wallet absent, is the
    /// native coin proxied through a jetton-shaped transfer.
    pub fn from_dex_transfer(
        asset: Option<&str>,
        source_wallet: Option<&str>,
        destination_wallet: Option<&str>,
    ) -> Result<Self, AssessError> {
        match (asset, source_wallet, destination_wallet) {
            (Some(asset), Some(_), Some(_)) => Self::normalize(asset),
            _ => Ok(Self::Native),
        }
    }

    /// Normalize an optional asset field, absent meaning the native coin
    pub fn from_optional(asset: Option<&str>) -> Result<Self, AssessError> {
        asset.map_or(Ok(Self::Native), Self::normalize)
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Spelling used in human-facing swap descriptors
    pub fn user_ref(&self) -> String {
        match self {
            Self::Native => NATIVE_SENTINEL.to_string(),
            Self::Token(addr) => addr.to_friendly(true, false),
        }
    }

    /// Spelling route-quoting services expect
    pub fn aggregator_ref(&self) -> String {
        match self {
            Self::Native => "native".to_string(),
            Self::Token(addr) => addr.to_friendly(true, false),
        }
    }
}

/// Parse an account reference in either encoding
pub fn parse_account(s: &str) -> Result<AccountAddress, AssessError> {
    AccountAddress::parse(s).map_err(|_| AssessError::MalformedAddress {
        address: s.to_string(),
    })
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str(NATIVE_SENTINEL),
            Self::Token(addr) => f.write_str(&addr.to_raw()),
        }
    }
}

impl FromStr for AssetId {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::normalize(&s).map_err(serde::de::Error::custom)
    }
}
