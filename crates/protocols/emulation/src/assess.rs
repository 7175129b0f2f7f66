//! Outcome Assessment
//!
//! Prices an [`AnalyzerOutput`] into the record stored per
//! (aggregator, swap) pair. Only the requested target asset counts on the
//! received side; intermediate assets that ended up with the sender are
//! visible in the legs but do not raise the loss ratio.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use swapbench_core::constants::{NANOTON_PER_TON, NATIVE_SYMBOL};
use swapbench_core::AssessError;
use ton_tx::AccountAddress;

use crate::analyzer::{analyze, AnalyzerOutput};
use crate::asset::AssetId;
use crate::metadata::TokenMetadata;
use crate::request::{AggregatorKind, SwapRequest};
use crate::state::{EmulationResult, Leg};

/// USD price per whole token
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<AssetId, f64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: AssetId, usd: f64) {
        self.prices.insert(asset, usd);
    }

    pub fn get(&self, asset: &AssetId) -> Option<f64> {
        self.prices.get(asset).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Load a `{asset: usd}` feed. `"TON"` names the native coin; every
    /// other key must be an address. Unparseable keys are skipped.
    pub fn from_feed(feed: &HashMap<String, f64>) -> Self {
        let mut table = Self::new();
        for (key, usd) in feed {
            let asset = if key.eq_ignore_ascii_case(NATIVE_SYMBOL) {
                AssetId::Native
            } else {
                match AssetId::normalize(key) {
                    Ok(asset) => asset,
                    Err(e) => {
                        tracing::warn!("Skipping price for {}: {}", key, e);
                        continue;
                    }
                }
            };
            table.insert(asset, *usd);
        }
        table
    }

    fn require(&self, asset: &AssetId) -> Result<f64, AssessError> {
        self.get(asset).ok_or_else(|| AssessError::MissingPrice {
            asset: asset.to_string(),
        })
    }
}

/// Non-fatal structural observations about one emulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub transaction_count: usize,
    pub max_depth: usize,
    pub orphan_outbound_count: usize,
    pub unknown_legs: usize,
}

/// Assessment of one aggregator route for one swap request
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRecord {
    pub aggregator: String,
    /// Swap descriptor, `"{amount} {in}->{out}"`
    pub swap: String,
    /// Target asset received, smallest units
    #[serde(serialize_with = "serialize_u128_str")]
    pub real_output: u128,
    pub loss_ratio: f64,
    pub outbound_legs: Vec<Leg>,
    pub inbound_legs: Vec<Leg>,
    /// Whole native coins
    pub gas_fee: f64,
    pub diagnostics: Diagnostics,
}

impl AssessmentRecord {
    pub fn legs_out_json(&self) -> Result<String, AssessError> {
        legs_json(&self.outbound_legs)
    }

    pub fn legs_in_json(&self) -> Result<String, AssessError> {
        legs_json(&self.inbound_legs)
    }
}

fn legs_json(legs: &[Leg]) -> Result<String, AssessError> {
    serde_json::to_string(legs).map_err(|e| AssessError::malformed(e.to_string()))
}

fn serialize_u128_str<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Price the analyzer output.
///
/// Every sent asset and the target need a price and known decimals, even
/// at zero amount. The input asset's decimals come from the request. The
/// loss ratio is 0 when nothing of value was sent.
pub fn assess(
    output: &AnalyzerOutput,
    request: &SwapRequest,
    prices: &PriceTable,
    metadata: &dyn TokenMetadata,
    aggregator: &AggregatorKind,
) -> Result<AssessmentRecord, AssessError> {
    let decimals_of = |asset: &AssetId| -> Result<u8, AssessError> {
        if *asset == request.input {
            return Ok(request.input_decimals);
        }
        metadata
            .decimals(asset)
            .ok_or_else(|| AssessError::MissingDecimals {
                asset: asset.to_string(),
            })
    };
    let usd_value = |asset: &AssetId, amount: u128| -> Result<f64, AssessError> {
        let price = prices.require(asset)?;
        let decimals = decimals_of(asset)?;
        Ok(amount as f64 / 10f64.powi(decimals as i32) * price)
    };

    let mut sent_usd = 0.0;
    for (asset, amount) in &output.sent_amounts {
        sent_usd += usd_value(asset, *amount)?;
    }

    let real_output = output
        .received_amounts
        .get(&request.output)
        .copied()
        .unwrap_or(0);
    let received_usd = usd_value(&request.output, real_output)?;

    let loss_ratio = if sent_usd > 0.0 {
        received_usd / sent_usd
    } else {
        0.0
    };

    let gas_fee = output.gas_fee as f64 / NANOTON_PER_TON as f64;

    tracing::info!(
        "{} {}: received {} (${:.4}) for ${:.4}, loss ratio {:.4}, gas {}",
        aggregator,
        request.descriptor(),
        real_output,
        received_usd,
        sent_usd,
        loss_ratio,
        gas_fee
    );

    Ok(AssessmentRecord {
        aggregator: aggregator.name().to_string(),
        swap: request.descriptor(),
        real_output,
        loss_ratio,
        outbound_legs: annotate(&output.outbound_legs, metadata),
        inbound_legs: annotate(&output.inbound_legs, metadata),
        gas_fee,
        diagnostics: Diagnostics {
            transaction_count: output.trace.transaction_count,
            max_depth: output.trace.max_depth,
            orphan_outbound_count: output.trace.orphan_outbound_count,
            unknown_legs: output.unknown_legs,
        },
    })
}

/// Analyze and assess in one step
pub fn assess_emulation(
    result: &EmulationResult,
    sender: &AccountAddress,
    request: &SwapRequest,
    prices: &PriceTable,
    metadata: &dyn TokenMetadata,
    aggregator: &AggregatorKind,
) -> Result<AssessmentRecord, AssessError> {
    let output = analyze(result, sender, &request.requested_input())?;
    assess(&output, request, prices, metadata, aggregator)
}

fn annotate(legs: &[Leg], metadata: &dyn TokenMetadata) -> Vec<Leg> {
    legs.iter()
        .map(|leg| {
            let mut leg = leg.clone();
            leg.in_symbol = leg.in_asset.as_ref().map(|a| metadata.symbol_or_unknown(a));
            leg.out_symbol = leg.out_asset.as_ref().map(|a| metadata.symbol_or_unknown(a));
            leg
        })
        .collect()
}
