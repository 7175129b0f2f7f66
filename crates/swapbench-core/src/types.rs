//! Core type definitions for swapbench

/// Wallet sequence number
pub type Seqno = u32;

/// Logical time of a transaction
pub type LogicalTime = u64;

/// Nanoton amount (1 TON = 1_000_000_000 nanoton)
pub type Nanoton = i128;

/// Constants
pub mod constants {
    use super::Nanoton;

    /// 1 TON in nanoton
    pub const NANOTON_PER_TON: Nanoton = 1_000_000_000;

    /// Decimals of the native coin
    pub const NATIVE_DECIMALS: u8 = 9;

    /// Textual sentinel for the native coin in asset maps and price feeds
    pub const NATIVE_SENTINEL: &str = "ton";

    /// Symbol shown for the native coin
    pub const NATIVE_SYMBOL: &str = "TON";

    /// Default wallet v4 subwallet id (698983191 = 0x29A9A317)
    pub const DEFAULT_WALLET_ID: u32 = 698_983_191;

    /// Send mode 3: pay transfer fees separately, ignore action-phase errors
    pub const DEFAULT_SEND_MODE: u8 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_id_constant() {
        assert_eq!(constants::DEFAULT_WALLET_ID, 0x29A9_A317);
    }
}
