//! Aggregator route messages
//!
//! Route-building services return the messages a wallet must send as JSON
//! objects like:
//!
//! ```json
//! { "address": "EQ...", "value": "18162793568750000", "cell": "te6cc...", "send_mode": 3 }
//! ```
//!
//! Services differ in naming: the amount is `value` or `amount`, the body
//! is `payload` or `cell`. The first non-blank field wins; a zero amount
//! counts as blank.

use serde::{Deserialize, Serialize};

use swapbench_core::constants::DEFAULT_SEND_MODE;
use swapbench_core::{Seqno, TxError, WalletConfig};

use crate::address::AccountAddress;
use crate::boc::cell_from_base64;
use crate::wallet::{build_external_message_with, ExternalMessage, SubTransfer};

/// Amount that may arrive as a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(u64),
    Text(String),
}

impl AmountField {
    /// Empty strings and zero defer to the next amount field
    fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn parse(&self) -> Result<u128, TxError> {
        match self {
            Self::Number(n) => Ok(*n as u128),
            Self::Text(s) => s.trim().parse().map_err(|_| TxError::InvalidAmount {
                value: s.clone(),
            }),
        }
    }
}

/// One message of an aggregator route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMessage {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AmountField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_mode: Option<u8>,
}

impl RouteMessage {
    /// Amount in nanoton; zero when no field carries a non-zero amount
    pub fn resolved_value(&self) -> Result<u128, TxError> {
        [&self.value, &self.amount]
            .into_iter()
            .flatten()
            .find(|f| !f.is_blank())
            .map(AmountField::parse)
            .unwrap_or(Ok(0))
    }

    /// Base64 BOC of the body, if any
    pub fn resolved_payload(&self) -> Option<&str> {
        [&self.payload, &self.cell]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    pub fn to_transfer(&self) -> Result<SubTransfer, TxError> {
        let destination = AccountAddress::parse(&self.address)?;
        let value = self.resolved_value()?;
        let payload = self
            .resolved_payload()
            .map(cell_from_base64)
            .transpose()?;
        Ok(SubTransfer::new(destination, value, payload)
            .with_send_mode(self.send_mode.unwrap_or(DEFAULT_SEND_MODE)))
    }
}

/// Parse a route's messages and pack them into one external message
pub fn build_external_message_from_route(
    sender: &str,
    seqno: Seqno,
    messages: &[RouteMessage],
    wallet: &WalletConfig,
) -> Result<ExternalMessage, TxError> {
    let sender = AccountAddress::parse(sender)?;
    let transfers = messages
        .iter()
        .map(RouteMessage::to_transfer)
        .collect::<Result<Vec<_>, _>>()?;
    build_external_message_with(&sender, seqno, &transfers, wallet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use crate::wallet::build_external_message;

    const SENDER: &str = "UQAPPgN25OQh3EOqqt0v_CRmScxa-_ulVwm5NESN1DO4gZzD";
    const POOL: &str = "EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs";

    fn payload_b64() -> String {
        // jetton transfer op and query id
        "te6cckEBAQEADgAAGA+KfqUAFgfwA1G55EN1mmk=".to_string()
    }

    #[test]
    fn test_parse_swap_coffee_shape() {
        let json = serde_json::json!({
            "address": POOL,
            "value": "18162793568750000",
            "cell": payload_b64(),
            "send_mode": 3,
            "query_id": 6201176916867556u64
        });
        let msg: RouteMessage = serde_json::from_value(json).unwrap();
        let transfer = msg.to_transfer().unwrap();
        assert_eq!(transfer.value, 18_162_793_568_750_000);
        assert_eq!(transfer.send_mode, 3);
        assert!(transfer.payload.is_some());
    }

    #[test]
    fn test_parse_amount_and_payload_aliases() {
        let json = serde_json::json!({
            "address": POOL,
            "amount": 250000000u64,
            "payload": payload_b64()
        });
        let msg: RouteMessage = serde_json::from_value(json).unwrap();
        let transfer = msg.to_transfer().unwrap();
        assert_eq!(transfer.value, 250_000_000);
        assert_eq!(transfer.send_mode, DEFAULT_SEND_MODE);
        assert!(transfer.payload.is_some());
    }

    #[test]
    fn test_value_wins_over_amount() {
        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": "7", "amount": "9"
        }))
        .unwrap();
        assert_eq!(msg.resolved_value().unwrap(), 7);

        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": "", "amount": "9"
        }))
        .unwrap();
        assert_eq!(msg.resolved_value().unwrap(), 9);
    }

    #[test]
    fn test_zero_value_falls_through_to_amount() {
        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": 0, "amount": "9"
        }))
        .unwrap();
        assert_eq!(msg.resolved_value().unwrap(), 9);

        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": 0
        }))
        .unwrap();
        assert_eq!(msg.resolved_value().unwrap(), 0);
    }

    #[test]
    fn test_missing_payload_is_empty_body() {
        let msg: RouteMessage =
            serde_json::from_value(serde_json::json!({ "address": POOL, "value": 1 })).unwrap();
        let transfer = msg.to_transfer().unwrap();
        assert!(transfer.payload.is_none());
        assert_eq!(transfer.value, 1);
    }

    #[test]
    fn test_bad_payload_is_serialization_failure() {
        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": "1", "payload": "AAAA"
        }))
        .unwrap();
        assert!(matches!(
            msg.to_transfer(),
            Err(TxError::SerializationFailed { .. })
        ));
    }

    #[test]
    fn test_hostile_cell_count_is_serialization_failure() {
        // header claims 0xFFFFFFFF cells backed by two bytes of data
        let boc = hex::decode("b5ee9c720401ffffffff0000000100000000020000000000").unwrap();
        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": "1", "payload": STANDARD.encode(boc)
        }))
        .unwrap();
        let err = msg.to_transfer().unwrap_err();
        match err {
            TxError::SerializationFailed { message } => {
                assert!(message.contains("header"), "{}", message)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_address_and_amount() {
        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": "nope", "value": "1"
        }))
        .unwrap();
        assert!(matches!(
            msg.to_transfer(),
            Err(TxError::InvalidAddress { .. })
        ));

        let msg: RouteMessage = serde_json::from_value(serde_json::json!({
            "address": POOL, "value": "12abc"
        }))
        .unwrap();
        assert!(matches!(
            msg.to_transfer(),
            Err(TxError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_route_matches_direct_build() {
        let messages: Vec<RouteMessage> = serde_json::from_value(serde_json::json!([
            { "address": POOL, "value": "100", "cell": payload_b64() },
            { "address": POOL, "amount": 200 }
        ]))
        .unwrap();

        let from_route =
            build_external_message_from_route(SENDER, 11, &messages, &WalletConfig::default())
                .unwrap();

        let transfers: Vec<_> = messages.iter().map(|m| m.to_transfer().unwrap()).collect();
        let direct =
            build_external_message(&AccountAddress::parse(SENDER).unwrap(), 11, &transfers)
                .unwrap();
        assert_eq!(from_route.to_base64(), direct.to_base64());
    }
}
