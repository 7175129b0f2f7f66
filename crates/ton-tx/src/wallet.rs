//! Wallet v4 external message builder
//!
//! Packs 1..=4 sub-transfers into a single external message in the wallet
//! v4 transfer format:
//!
//! ```text
//! signature:bits512 subwallet_id:uint32 valid_until:uint32 seqno:uint32 op:uint8
//! (send_mode:uint8 ^message)*
//! ```
//!
//! The signature covers the hash of everything after it. Emulation runs
//! with signature checking disabled, so the signature only has to be
//! structurally present.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use tonlib_core::cell::{ArcCell, Cell, CellBuilder};

use swapbench_core::constants::DEFAULT_SEND_MODE;
use swapbench_core::{Seqno, TxError, WalletConfig};

use crate::address::AccountAddress;
use crate::boc::serialize_boc;
use crate::message::{cell_error, ExternalInMessage, InternalMessage};

/// Private key that fills the signature slot of emulated transfers.
///
/// Never used for authorization: emulation runs with `ignore_chksig`, and
/// this key must not sign anything meant for a live network.
pub const EMULATION_SIGNING_KEY: [u8; 32] = [0x07; 32];

/// Wallet v4 sends at most four messages per transfer (one per cell ref)
pub const WALLET_V4_MAX_MESSAGES: usize = 4;

/// Wallet v4 "simple send" op
const OP_SIMPLE_SEND: u8 = 0;

/// One transfer the wallet should dispatch
#[derive(Debug, Clone)]
pub struct SubTransfer {
    pub destination: AccountAddress,
    pub value: u128,
    pub payload: Option<ArcCell>,
    pub send_mode: u8,
}

impl SubTransfer {
    pub fn new(destination: AccountAddress, value: u128, payload: Option<ArcCell>) -> Self {
        Self {
            destination,
            value,
            payload,
            send_mode: DEFAULT_SEND_MODE,
        }
    }

    pub fn with_send_mode(mut self, send_mode: u8) -> Self {
        self.send_mode = send_mode;
        self
    }
}

/// Internal message plus the send mode the wallet applies to it
#[derive(Debug, Clone)]
pub struct WalletMessage {
    pub send_mode: u8,
    pub message: InternalMessage,
}

impl WalletMessage {
    pub fn from_transfer(sender: &AccountAddress, transfer: &SubTransfer) -> Self {
        Self {
            send_mode: transfer.send_mode,
            message: InternalMessage::transfer(
                sender,
                &transfer.destination,
                transfer.value,
                transfer.payload.clone(),
            ),
        }
    }
}

/// Serialized external message ready for the emulator's `boc` field
#[derive(Debug, Clone)]
pub struct ExternalMessage {
    cell: Cell,
    boc: Vec<u8>,
}

impl ExternalMessage {
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.boc
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.boc)
    }

    /// Hash of the message cell, hex-encoded
    pub fn hash_hex(&self) -> String {
        hex::encode(self.cell.cell_hash())
    }
}

/// Build an external message with the default wallet settings
pub fn build_external_message(
    sender: &AccountAddress,
    seqno: Seqno,
    transfers: &[SubTransfer],
) -> Result<ExternalMessage, TxError> {
    build_external_message_with(sender, seqno, transfers, &WalletConfig::default())
}

/// Build an external message that dispatches `transfers` in order.
///
/// Identical inputs always produce byte-identical output.
pub fn build_external_message_with(
    sender: &AccountAddress,
    seqno: Seqno,
    transfers: &[SubTransfer],
    wallet: &WalletConfig,
) -> Result<ExternalMessage, TxError> {
    if transfers.is_empty() {
        return Err(TxError::NoTransfers);
    }
    if transfers.len() > WALLET_V4_MAX_MESSAGES {
        return Err(TxError::TooManyTransfers {
            count: transfers.len(),
            max: WALLET_V4_MAX_MESSAGES,
        });
    }

    let messages: Vec<WalletMessage> = transfers
        .iter()
        .map(|t| WalletMessage::from_transfer(sender, t))
        .collect();

    let unsigned = unsigned_transfer_body(wallet, seqno, &messages)?;
    let body = sign_transfer_body(&unsigned)?;
    let cell = ExternalInMessage::new(sender, Arc::new(body)).to_cell()?;
    let boc = serialize_boc(&cell, true)?;

    tracing::debug!(
        "Built external message for {} (seqno {}, {} transfers, {} bytes)",
        sender,
        seqno,
        messages.len(),
        boc.len()
    );

    Ok(ExternalMessage { cell, boc })
}

fn unsigned_transfer_body(
    wallet: &WalletConfig,
    seqno: Seqno,
    messages: &[WalletMessage],
) -> Result<Cell, TxError> {
    let mut b = CellBuilder::new();
    b.store_u32(32, wallet.wallet_id)
        .and_then(|b| b.store_u32(32, wallet.valid_until))
        .and_then(|b| b.store_u32(32, seqno))
        .and_then(|b| b.store_u8(8, OP_SIMPLE_SEND))
        .map_err(cell_error)?;
    for msg in messages {
        let message = Arc::new(msg.message.to_cell()?);
        b.store_u8(8, msg.send_mode)
            .and_then(|b| b.store_reference(&message))
            .map_err(cell_error)?;
    }
    b.build().map_err(cell_error)
}

fn sign_transfer_body(unsigned: &Cell) -> Result<Cell, TxError> {
    let key = SigningKey::from_bytes(&EMULATION_SIGNING_KEY);
    let signature = key.sign(&unsigned.cell_hash());

    CellBuilder::new()
        .store_slice(&signature.to_bytes())
        .and_then(|b| b.store_cell(unsigned))
        .and_then(|b| b.build())
        .map_err(cell_error)
}
