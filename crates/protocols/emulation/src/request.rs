//! Swap requests and emulator requests
//!
//! A [`SwapRequest`] always carries its amount in smallest units. Route
//! services disagree on the unit they quote in, so [`AggregatorKind`]
//! converts at the quoting boundary and nowhere else.

use std::fmt;

use serde::{Deserialize, Serialize};

use swapbench_core::EmulatorConfig;
use ton_tx::ExternalMessage;

use crate::analyzer::RequestedInput;
use crate::asset::AssetId;

/// One swap to quote, emulate and assess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub input: AssetId,
    pub output: AssetId,
    /// Input amount in smallest units
    pub amount: u128,
    pub input_decimals: u8,
}

impl SwapRequest {
    pub fn new(input: AssetId, output: AssetId, amount: u128, input_decimals: u8) -> Self {
        Self {
            input,
            output,
            amount,
            input_decimals,
        }
    }

    /// Build a request from a whole-unit amount.
    ///
    /// Returns `None` when the amount overflows the smallest-unit scale.
    pub fn from_whole(input: AssetId, output: AssetId, whole: u64, input_decimals: u8) -> Option<Self> {
        let scale = 10u128.checked_pow(input_decimals as u32)?;
        let amount = (whole as u128).checked_mul(scale)?;
        Some(Self::new(input, output, amount, input_decimals))
    }

    /// Amount in whole units as a decimal string, trailing zeros trimmed
    pub fn whole_amount(&self) -> String {
        format_units(self.amount, self.input_decimals)
    }

    /// Storage key for this swap: `"{whole amount} {in}->{out}"`
    pub fn descriptor(&self) -> String {
        format!(
            "{} {}->{}",
            self.whole_amount(),
            self.input.user_ref(),
            self.output.user_ref()
        )
    }

    /// Input hint for the analyzer's gas correction
    pub fn requested_input(&self) -> RequestedInput {
        RequestedInput {
            asset: self.input,
            amount: self.amount,
        }
    }
}

impl fmt::Display for SwapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Render `amount / 10^decimals` without floating point
pub fn format_units(amount: u128, decimals: u8) -> String {
    let Some(scale) = 10u128.checked_pow(decimals as u32) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Unit an aggregator expects the input amount in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteUnit {
    Whole,
    Smallest,
}

/// Route-quoting service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorKind {
    SwapCoffee,
    DeDust,
    Other(String),
}

impl AggregatorKind {
    /// Name stored with each assessment
    pub fn name(&self) -> &str {
        match self {
            Self::SwapCoffee => "Coffee.swap",
            Self::DeDust => "DeDust",
            Self::Other(name) => name,
        }
    }

    pub fn input_unit(&self) -> QuoteUnit {
        match self {
            Self::SwapCoffee => QuoteUnit::Whole,
            Self::DeDust | Self::Other(_) => QuoteUnit::Smallest,
        }
    }

    /// Input amount spelled the way this aggregator's route endpoint expects
    pub fn quote_amount(&self, request: &SwapRequest) -> String {
        match self.input_unit() {
            QuoteUnit::Whole => request.whole_amount(),
            QuoteUnit::Smallest => request.amount.to_string(),
        }
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of an `emulateTrace` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulationRequest {
    pub boc: String,
    pub ignore_chksig: bool,
    pub with_actions: bool,
    pub include_code_data: bool,
}

impl EmulationRequest {
    pub fn from_message(message: &ExternalMessage, config: &EmulatorConfig) -> Self {
        Self {
            boc: message.to_base64(),
            ignore_chksig: config.ignore_chksig,
            with_actions: config.with_actions,
            include_code_data: config.include_code_data,
        }
    }
}
