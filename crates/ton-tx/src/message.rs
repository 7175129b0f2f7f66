//! Message TL-B layouts
//!
//! ```text
//! int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
//!   src:MsgAddressInt dest:MsgAddressInt value:CurrencyCollection
//!   ihr_fee:Grams fwd_fee:Grams created_lt:uint64 created_at:uint32
//! ext_in_msg_info$10 src:MsgAddressExt dest:MsgAddressInt import_fee:Grams
//! message$_ info init:(Maybe (Either StateInit ^StateInit)) body:(Either X ^X)
//! ```
//!
//! Messages built here never carry a state init and never carry extra
//! currencies.

use num_bigint::BigUint;
use swapbench_core::TxError;
use tonlib_core::cell::{ArcCell, Cell, CellBuilder, TonCellError};

use crate::address::AccountAddress;

const MAX_CELL_BITS: usize = 1023;
const MAX_CELL_REFS: usize = 4;

/// `Grams` is var_uint 16: at most 15 value bytes
const MAX_GRAMS_BITS: u64 = 120;

/// Internal message dispatched by the wallet
#[derive(Debug, Clone)]
pub struct InternalMessage {
    pub ihr_disabled: bool,
    pub bounce: bool,
    pub bounced: bool,
    pub src: AccountAddress,
    pub dest: AccountAddress,
    pub value: u128,
    pub created_lt: u64,
    pub created_at: u32,
    pub body: Option<ArcCell>,
}

impl InternalMessage {
    /// Bounceable transfer with zero fees and zero timestamps; the executing
    /// party fills in logical time and creation time.
    pub fn transfer(
        src: &AccountAddress,
        dest: &AccountAddress,
        value: u128,
        body: Option<ArcCell>,
    ) -> Self {
        Self {
            ihr_disabled: true,
            bounce: true,
            bounced: false,
            src: *src,
            dest: *dest,
            value,
            created_lt: 0,
            created_at: 0,
            body,
        }
    }

    pub fn to_cell(&self) -> Result<Cell, TxError> {
        let mut b = CellBuilder::new();
        b.store_bit(false)
            .and_then(|b| b.store_bit(self.ihr_disabled))
            .and_then(|b| b.store_bit(self.bounce))
            .and_then(|b| b.store_bit(self.bounced))
            .and_then(|b| b.store_address(&self.src.to_ton()))
            .and_then(|b| b.store_address(&self.dest.to_ton()))
            .map_err(cell_error)?;
        store_grams(&mut b, self.value)?;
        b.store_bit(false) // no extra currencies
            .and_then(|b| b.store_u8(4, 0)) // ihr_fee
            .and_then(|b| b.store_u8(4, 0)) // fwd_fee
            .and_then(|b| b.store_u64(64, self.created_lt))
            .and_then(|b| b.store_u32(32, self.created_at))
            .and_then(|b| b.store_bit(false)) // no state init
            .map_err(cell_error)?;
        let header = b.build().map_err(cell_error)?;
        with_body(&header, self.body.as_ref())
    }
}

/// Inbound external message addressed to a wallet
#[derive(Debug, Clone)]
pub struct ExternalInMessage {
    pub dest: AccountAddress,
    pub body: ArcCell,
}

impl ExternalInMessage {
    pub fn new(dest: &AccountAddress, body: ArcCell) -> Self {
        Self { dest: *dest, body }
    }

    pub fn to_cell(&self) -> Result<Cell, TxError> {
        let header = CellBuilder::new()
            .store_u8(2, 0b10)
            .and_then(|b| b.store_u8(2, 0b00)) // src: addr_none
            .and_then(|b| b.store_address(&self.dest.to_ton()))
            .and_then(|b| b.store_u8(4, 0)) // import_fee
            .and_then(|b| b.store_bit(false)) // no state init
            .and_then(|b| b.build())
            .map_err(cell_error)?;
        with_body(&header, Some(&self.body))
    }
}

fn store_grams(b: &mut CellBuilder, value: u128) -> Result<(), TxError> {
    let value = BigUint::from(value);
    if value.bits() > MAX_GRAMS_BITS {
        return Err(TxError::SerializationFailed {
            message: format!("coin amount {} exceeds 120 bits", value),
        });
    }
    b.store_coins(&value).map_err(cell_error)?;
    Ok(())
}

/// Append `Either X ^X`: inline when the body fits after the header
fn with_body(header: &Cell, body: Option<&ArcCell>) -> Result<Cell, TxError> {
    let mut b = CellBuilder::new();
    b.store_cell(header).map_err(cell_error)?;
    match body {
        None => b.store_bit(false).map_err(cell_error)?,
        Some(body) => {
            let fits = header.bit_len() + 1 + body.bit_len() <= MAX_CELL_BITS
                && header.references().len() + body.references().len() <= MAX_CELL_REFS;
            if fits {
                b.store_bit(false)
                    .and_then(|b| b.store_cell(body))
                    .map_err(cell_error)?
            } else {
                b.store_bit(true)
                    .and_then(|b| b.store_reference(body))
                    .map_err(cell_error)?
            }
        }
    };
    b.build().map_err(cell_error)
}

pub(crate) fn cell_error(err: TonCellError) -> TxError {
    TxError::SerializationFailed {
        message: err.to_string(),
    }
}
