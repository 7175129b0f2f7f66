//! Emulation Result Types
//!
//! Typed view of the emulator's `emulateTrace` response:
//!
//! ```text
//! {
//!   "transactions":   { "<hash>": { account, lt, account_state_before, account_state_after, in_msg, out_msgs } },
//!   "account_states": { "<hash>": { balance, last_trans_lt } },
//!   "trace":          { tx_hash, children: [ ... ] },
//!   "actions":        [ { type, success, details } ]
//! }
//! ```
//!
//! Unknown fields are ignored; missing required fields fail the parse so
//! the analyzer never guesses.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use swapbench_core::AssessError;

use crate::asset::AssetId;

/// Dex label for legs the emulator reported without swap metadata
pub const UNKNOWN_DEX: &str = "UNKNOWN";

/// Integer that may arrive as a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(u64),
    Text(String),
}

impl Numeric {
    pub fn as_u128(&self, field: &str) -> Result<u128, AssessError> {
        match self {
            Self::Number(n) => Ok(*n as u128),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AssessError::malformed(format!("{} is not an integer: {:?}", field, s))),
        }
    }

    pub fn as_u64(&self, field: &str) -> Result<u64, AssessError> {
        let value = self.as_u128(field)?;
        u64::try_from(value)
            .map_err(|_| AssessError::malformed(format!("{} out of range: {}", field, value)))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Full emulation response
#[derive(Debug, Clone, Deserialize)]
pub struct EmulationResult {
    pub transactions: BTreeMap<String, Transaction>,
    #[serde(default)]
    pub account_states: BTreeMap<String, AccountState>,
    pub trace: TraceNode,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl EmulationResult {
    pub fn from_json(json: &str) -> Result<Self, AssessError> {
        serde_json::from_str(json).map_err(malformed)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, AssessError> {
        if value.get("transactions").is_none() {
            tracing::warn!("Emulation result has no transactions: {}", value);
            return Err(AssessError::malformed("missing transactions"));
        }
        serde_json::from_value(value).map_err(malformed)
    }

    /// Balance recorded by an account state reference, resolving hashes
    /// through `account_states` when the reference carries no balance.
    pub fn resolve_balance(
        &self,
        state: Option<&AccountStateRef>,
        hash: Option<&str>,
        tx_hash: &str,
    ) -> Result<u128, AssessError> {
        if let Some(balance) = state.and_then(|s| s.balance.as_ref()) {
            return balance.as_u128("balance");
        }
        let hash = state
            .and_then(|s| s.hash.as_deref())
            .or(hash)
            .ok_or_else(|| {
                AssessError::malformed(format!("transaction {} has no account state", tx_hash))
            })?;
        self.account_states
            .get(hash)
            .ok_or_else(|| AssessError::malformed(format!("unknown account state {}", hash)))?
            .balance
            .as_u128("balance")
    }
}

fn malformed(err: serde_json::Error) -> AssessError {
    tracing::warn!("Failed to parse emulation result: {}", err);
    AssessError::malformed(err.to_string())
}

/// One emulated transaction
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub account: String,
    pub lt: Numeric,
    #[serde(default)]
    pub account_state_before: Option<AccountStateRef>,
    #[serde(default)]
    pub account_state_after: Option<AccountStateRef>,
    #[serde(default)]
    pub account_state_hash_before: Option<String>,
    #[serde(default)]
    pub account_state_hash_after: Option<String>,
    #[serde(default)]
    pub in_msg: Option<MessageRef>,
    #[serde(default)]
    pub out_msgs: Vec<MessageRef>,
}

/// Account state as embedded in a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct AccountStateRef {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub balance: Option<Numeric>,
}

/// Account state from the `account_states` map
#[derive(Debug, Clone, Deserialize)]
pub struct AccountState {
    pub balance: Numeric,
    #[serde(default)]
    pub last_trans_lt: Option<Numeric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub hash: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub value: Option<Numeric>,
}

/// Node of the execution trace tree
#[derive(Debug, Clone, Deserialize)]
pub struct TraceNode {
    pub tx_hash: String,
    #[serde(default)]
    pub in_msg_hash: Option<String>,
    #[serde(default)]
    pub children: Vec<TraceNode>,
}

/// Classified action from the emulator
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawAction")]
pub enum Action {
    JettonSwap(SwapDetails),
    JettonTransfer(TransferDetails),
    Other { kind: String },
}

#[derive(Debug, Clone, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    details: serde_json::Value,
}

impl TryFrom<RawAction> for Action {
    type Error = String;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "jetton_swap" => serde_json::from_value(raw.details)
                .map(Action::JettonSwap)
                .map_err(|e| format!("jetton_swap details: {}", e)),
            "jetton_transfer" => serde_json::from_value(raw.details)
                .map(Action::JettonTransfer)
                .map_err(|e| format!("jetton_transfer details: {}", e)),
            _ => Ok(Action::Other { kind: raw.kind }),
        }
    }
}

/// Details of a `jetton_swap` action
#[derive(Debug, Clone, Deserialize)]
pub struct SwapDetails {
    pub dex: String,
    #[serde(default)]
    pub sender: Option<String>,
    pub dex_incoming_transfer: DexTransfer,
    pub dex_outgoing_transfer: DexTransfer,
    #[serde(default)]
    pub peer_swaps: Vec<PeerSwap>,
}

/// One side of a swap as seen by the DEX
#[derive(Debug, Clone, Deserialize)]
pub struct DexTransfer {
    pub asset: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub source_jetton_wallet: Option<String>,
    pub destination_jetton_wallet: Option<String>,
    pub amount: Numeric,
}

impl DexTransfer {
    pub fn asset_id(&self) -> Result<AssetId, AssessError> {
        AssetId::from_dex_transfer(
            self.asset.as_deref(),
            self.source_jetton_wallet.as_deref(),
            self.destination_jetton_wallet.as_deref(),
        )
    }
}

/// Nested swap reported inside a multi-pool swap action
#[derive(Debug, Clone, Deserialize)]
pub struct PeerSwap {
    #[serde(default)]
    pub asset_in: Option<String>,
    #[serde(default)]
    pub asset_out: Option<String>,
    #[serde(default)]
    pub amount_in: Option<Numeric>,
    #[serde(default)]
    pub amount_out: Option<Numeric>,
}

/// Details of a `jetton_transfer` action
#[derive(Debug, Clone, Deserialize)]
pub struct TransferDetails {
    pub asset: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    #[serde(default)]
    pub sender_jetton_wallet: Option<String>,
    #[serde(default)]
    pub receiver_jetton_wallet: Option<String>,
    pub amount: Numeric,
}

/// Human-readable swap or transfer step attributed to the sender.
///
/// Serialized with the upper-case keys stored alongside each assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(rename = "DEX")]
    pub dex: String,
    #[serde(rename = "IN", default, skip_serializing_if = "Option::is_none")]
    pub in_amount: Option<String>,
    #[serde(rename = "IN_ASSET", default, skip_serializing_if = "Option::is_none")]
    pub in_asset: Option<AssetId>,
    #[serde(rename = "IN_ASSET_SHORT", default, skip_serializing_if = "Option::is_none")]
    pub in_symbol: Option<String>,
    #[serde(rename = "OUT", default, skip_serializing_if = "Option::is_none")]
    pub out_amount: Option<String>,
    #[serde(rename = "OUT_ASSET", default, skip_serializing_if = "Option::is_none")]
    pub out_asset: Option<AssetId>,
    #[serde(rename = "OUT_ASSET_SHORT", default, skip_serializing_if = "Option::is_none")]
    pub out_symbol: Option<String>,
}

impl Leg {
    pub fn swap(dex: &str, input: (AssetId, u128), output: (AssetId, u128)) -> Self {
        Self {
            dex: dex.to_string(),
            in_amount: Some(input.1.to_string()),
            in_asset: Some(input.0),
            in_symbol: None,
            out_amount: Some(output.1.to_string()),
            out_asset: Some(output.0),
            out_symbol: None,
        }
    }

    pub fn unknown_sent(asset: AssetId, amount: u128) -> Self {
        Self {
            dex: UNKNOWN_DEX.to_string(),
            in_amount: Some(amount.to_string()),
            in_asset: Some(asset),
            in_symbol: None,
            out_amount: None,
            out_asset: None,
            out_symbol: None,
        }
    }

    pub fn unknown_received(asset: AssetId, amount: u128) -> Self {
        Self {
            dex: UNKNOWN_DEX.to_string(),
            in_amount: None,
            in_asset: None,
            in_symbol: None,
            out_amount: Some(amount.to_string()),
            out_asset: Some(asset),
            out_symbol: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.dex == UNKNOWN_DEX
    }
}
