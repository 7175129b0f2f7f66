//! ton-tx: Transaction building utilities for TON
//!
//! Provides account addresses, bag-of-cells helpers, message layouts, and
//! the wallet v4 external message builder used for emulation. Cells and
//! their codec come from `tonlib_core`.

pub mod address;
pub mod boc;
pub mod message;
pub mod route;
pub mod wallet;

pub use address::{AccountAddress, AddressError};
pub use boc::{cell_from_base64, cell_to_base64, deserialize_boc, serialize_boc, BocError};
pub use message::{ExternalInMessage, InternalMessage};
pub use route::{build_external_message_from_route, AmountField, RouteMessage};
pub use tonlib_core::cell::{ArcCell, Cell, CellBuilder};
pub use wallet::{
    build_external_message, build_external_message_with, ExternalMessage, SubTransfer,
    WalletMessage, EMULATION_SIGNING_KEY, WALLET_V4_MAX_MESSAGES,
};
