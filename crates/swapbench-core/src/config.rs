//! Configuration types for swapbench

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WALLET_ID;

/// Emulation switches sent along with each message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Skip signature verification during emulation
    #[serde(default = "default_true")]
    pub ignore_chksig: bool,

    /// Ask the emulator to classify the trace into actions
    #[serde(default = "default_true")]
    pub with_actions: bool,

    #[serde(default)]
    pub include_code_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            ignore_chksig: true,
            with_actions: true,
            include_code_data: false,
        }
    }
}

/// Wallet transfer settings used when packing a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Subwallet id stored in the transfer body
    #[serde(default = "default_wallet_id")]
    pub wallet_id: u32,

    /// Expiry stored in the transfer body (unix time)
    #[serde(default = "default_valid_until")]
    pub valid_until: u32,
}

fn default_wallet_id() -> u32 {
    DEFAULT_WALLET_ID
}

fn default_valid_until() -> u32 {
    u32::MAX
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_id: default_wallet_id(),
            valid_until: default_valid_until(),
        }
    }
}
