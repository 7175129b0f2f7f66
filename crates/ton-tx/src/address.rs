//! TON account address utilities
//!
//! Two textual encodings denote the same account:
//! - raw: `<workchain>:<64 hex chars>`, canonicalized here to uppercase hex
//! - user-friendly: 48 chars of base64 (url-safe or standard) carrying a
//!   flags tag and a CRC16 checksum
//!
//! Decoding and checksum verification go through [`TonAddress`]; this
//! wrapper adds the ordering, hashing and `Copy` the analyzer keys maps by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tonlib_core::TonAddress;

/// Standard (`addr_std`) account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl AccountAddress {
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Parse either the raw or the user-friendly encoding.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let parsed = TonAddress::from_str(s)
            .map_err(|e| AddressError::InvalidFormat(format!("{}: {}", s, e)))?;
        Self::try_from(&parsed)
    }

    /// Raw encoding with uppercase hex, the form emulator output uses
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode_upper(self.hash))
    }

    /// User-friendly encoding (url-safe alphabet)
    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        self.to_ton().to_base64_url_flags(!bounceable, testnet)
    }

    pub fn to_ton(&self) -> TonAddress {
        TonAddress::new(self.workchain as i32, &self.hash)
    }
}

impl TryFrom<&TonAddress> for AccountAddress {
    type Error = AddressError;

    fn try_from(addr: &TonAddress) -> Result<Self, Self::Error> {
        let workchain = i8::try_from(addr.workchain)
            .map_err(|_| AddressError::InvalidWorkchain(addr.workchain.to_string()))?;
        Ok(Self {
            workchain,
            hash: addr.hash_part,
        })
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid TON address: {0}")]
    InvalidFormat(String),

    #[error("Invalid workchain: {0}")]
    InvalidWorkchain(String),
}

impl From<AddressError> for swapbench_core::TxError {
    fn from(err: AddressError) -> Self {
        let address = match err {
            AddressError::InvalidFormat(s) | AddressError::InvalidWorkchain(s) => s,
        };
        swapbench_core::TxError::InvalidAddress { address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER_FRIENDLY: &str = "UQAPPgN25OQh3EOqqt0v_CRmScxa-_ulVwm5NESN1DO4gZzD";
    const SENDER_RAW: &str = "0:0F3E0376E4E421DC43AAAADD2FFC246649CC5AFBFBA55709B934448DD433B881";
    const USDT_FRIENDLY: &str = "EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs";
    const USDT_RAW: &str = "0:B113A994B5024A16719F69139328EB759596C38A25F59028B146FECDC3621DFE";

    #[test]
    fn test_friendly_to_raw() {
        let addr = AccountAddress::parse(SENDER_FRIENDLY).unwrap();
        assert_eq!(addr.to_raw(), SENDER_RAW);

        let usdt = AccountAddress::parse(USDT_FRIENDLY).unwrap();
        assert_eq!(usdt.to_raw(), USDT_RAW);
    }

    #[test]
    fn test_raw_is_case_insensitive() {
        let lower = AccountAddress::parse(&SENDER_RAW.to_lowercase()).unwrap();
        let upper = AccountAddress::parse(SENDER_RAW).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_raw(), SENDER_RAW);
    }

    #[test]
    fn test_friendly_round_trip() {
        let addr = AccountAddress::parse(SENDER_RAW).unwrap();
        assert_eq!(addr.to_friendly(false, false), SENDER_FRIENDLY);
        assert_eq!(
            addr.to_friendly(true, false),
            "EQAPPgN25OQh3EOqqt0v_CRmScxa-_ulVwm5NESN1DO4gcEG"
        );
        assert_eq!(
            AccountAddress::parse(USDT_RAW).unwrap().to_friendly(true, false),
            USDT_FRIENDLY
        );
    }

    #[test]
    fn test_standard_alphabet_accepted() {
        let standard = SENDER_FRIENDLY.replace('-', "+").replace('_', "/");
        let addr = AccountAddress::parse(&standard).unwrap();
        assert_eq!(addr.to_raw(), SENDER_RAW);
    }

    #[test]
    fn test_masterchain_raw() {
        let raw = format!("-1:{}", "AB".repeat(32));
        let addr = AccountAddress::parse(&raw).unwrap();
        assert_eq!(addr.workchain, -1);
        assert_eq!(addr.to_raw(), raw);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut broken = SENDER_FRIENDLY.to_string();
        broken.replace_range(47..48, "E");
        assert!(matches!(
            AccountAddress::parse(&broken),
            Err(AddressError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(AccountAddress::parse("not_an_address").is_err());
        assert!(AccountAddress::parse("0:1234").is_err());
        assert!(matches!(
            AccountAddress::parse(&format!("300:{}", "00".repeat(32))),
            Err(AddressError::InvalidWorkchain(_))
        ));
        assert!(AccountAddress::parse("").is_err());
    }

    #[test]
    fn test_serde_uses_raw_form() {
        let addr = AccountAddress::parse(SENDER_FRIENDLY).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", SENDER_RAW));
        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
