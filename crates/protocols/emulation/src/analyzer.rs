//! Emulation Trace Analyzer
//!
//! Derives what the sender actually sent and received from an emulation:
//!
//! 1. Native balance delta from the sender's first and last transaction
//! 2. Jetton amounts from `jetton_swap` legs touching the sender
//! 3. Jetton amounts from bare `jetton_transfer` actions (legs the emulator
//!    could not classify as swaps), labelled `UNKNOWN`
//! 4. Native outflow replaced by the balance delta, which already includes gas
//! 5. Structural trace statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use swapbench_core::{AssessError, LogicalTime, Nanoton};
use ton_tx::AccountAddress;

use crate::asset::AssetId;
use crate::state::{Action, EmulationResult, Leg, SwapDetails, TransferDetails};
use crate::trace::TraceStats;

/// The asset and amount the route was asked to spend, in smallest units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedInput {
    pub asset: AssetId,
    pub amount: u128,
}

/// Account balance around one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub before: u128,
    pub after: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerOutput {
    /// Sender's native balance change over the whole trace
    pub balance_delta: Nanoton,
    pub sent_amounts: BTreeMap<AssetId, u128>,
    pub received_amounts: BTreeMap<AssetId, u128>,
    pub outbound_legs: Vec<Leg>,
    pub inbound_legs: Vec<Leg>,
    /// Native units consumed beyond the requested native principal
    pub gas_fee: Nanoton,
    pub trace: TraceStats,
    /// Legs recorded without swap metadata
    pub unknown_legs: usize,
}

/// Analyze an emulation from the point of view of `sender`.
pub fn analyze(
    result: &EmulationResult,
    sender: &AccountAddress,
    requested: &RequestedInput,
) -> Result<AnalyzerOutput, AssessError> {
    let snapshots = sender_balances(result, sender)?;
    if snapshots.is_empty() {
        return Err(AssessError::AccountNotFound {
            account: sender.to_raw(),
        });
    }

    let balance_delta = balance_delta(&snapshots);

    let mut folder = LegFolder::new(sender);
    for action in &result.actions {
        match action {
            Action::JettonSwap(swap) => folder.fold_swap(swap)?,
            Action::JettonTransfer(transfer) => folder.fold_transfer(transfer)?,
            Action::Other { .. } => {}
        }
    }

    // The balance delta nets out gas, so it replaces any native amount
    // folded from actions.
    let native_out = u128::try_from(-balance_delta).unwrap_or(0);
    folder.sent.insert(AssetId::Native, native_out);

    let mut gas_fee = -balance_delta;
    if requested.asset.is_native() {
        gas_fee -= requested.amount as Nanoton;
    }

    let trace = TraceStats::collect(result);

    tracing::debug!(
        "Analyzed trace {} for {}: delta {}, {} out legs, {} in legs, {} transactions",
        result.trace.tx_hash,
        sender,
        balance_delta,
        folder.outbound.len(),
        folder.inbound.len(),
        trace.transaction_count
    );

    Ok(AnalyzerOutput {
        balance_delta,
        sent_amounts: folder.sent,
        received_amounts: folder.received,
        outbound_legs: folder.outbound,
        inbound_legs: folder.inbound,
        gas_fee,
        trace,
        unknown_legs: folder.unknown,
    })
}

/// The sender's balance around each of its transactions, keyed by logical
/// time. Other accounts' transactions are never resolved, and an account
/// string that does not parse cannot be the sender.
pub fn sender_balances(
    result: &EmulationResult,
    sender: &AccountAddress,
) -> Result<BTreeMap<LogicalTime, BalanceSnapshot>, AssessError> {
    let mut snapshots = BTreeMap::new();

    for (tx_hash, tx) in &result.transactions {
        match AccountAddress::parse(&tx.account) {
            Ok(account) if account == *sender => {}
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("Transaction {} has unparseable account: {}", tx_hash, e);
                continue;
            }
        }
        let lt = tx.lt.as_u64("lt")?;
        let before = result.resolve_balance(
            tx.account_state_before.as_ref(),
            tx.account_state_hash_before.as_deref(),
            tx_hash,
        )?;
        let after = result.resolve_balance(
            tx.account_state_after.as_ref(),
            tx.account_state_hash_after.as_deref(),
            tx_hash,
        )?;
        snapshots.entry(lt).or_insert(BalanceSnapshot { before, after });
    }

    Ok(snapshots)
}

/// Balance after the last transaction minus balance before the first
fn balance_delta(snapshots: &BTreeMap<LogicalTime, BalanceSnapshot>) -> Nanoton {
    match (snapshots.values().next(), snapshots.values().next_back()) {
        (Some(first), Some(last)) => last.after as Nanoton - first.before as Nanoton,
        _ => 0,
    }
}

struct LegFolder<'a> {
    sender: &'a AccountAddress,
    sent: BTreeMap<AssetId, u128>,
    received: BTreeMap<AssetId, u128>,
    outbound: Vec<Leg>,
    inbound: Vec<Leg>,
    unknown: usize,
}

impl<'a> LegFolder<'a> {
    fn new(sender: &'a AccountAddress) -> Self {
        Self {
            sender,
            sent: BTreeMap::new(),
            received: BTreeMap::new(),
            outbound: Vec::new(),
            inbound: Vec::new(),
            unknown: 0,
        }
    }

    /// Counterparties that do not parse (empty strings, external
    /// addresses) are never the sender.
    fn is_sender(&self, account: Option<&str>) -> bool {
        let Some(account) = account else {
            return false;
        };
        match AccountAddress::parse(account) {
            Ok(parsed) => parsed == *self.sender,
            Err(e) => {
                tracing::debug!("Ignoring unparseable counterparty {:?}: {}", account, e);
                false
            }
        }
    }

    fn fold_swap(&mut self, swap: &SwapDetails) -> Result<(), AssessError> {
        let incoming = &swap.dex_incoming_transfer;
        let outgoing = &swap.dex_outgoing_transfer;
        let sent_by_sender = self.is_sender(incoming.source.as_deref());
        let received_by_sender = self.is_sender(outgoing.destination.as_deref());
        if !sent_by_sender && !received_by_sender {
            return Ok(());
        }

        let input = (incoming.asset_id()?, incoming.amount.as_u128("amount")?);
        let output = (outgoing.asset_id()?, outgoing.amount.as_u128("amount")?);
        let leg = Leg::swap(&swap.dex, input, output);

        if sent_by_sender {
            *self.sent.entry(input.0).or_default() += input.1;
            self.outbound.push(leg.clone());
        }
        if received_by_sender {
            *self.received.entry(output.0).or_default() += output.1;
            self.inbound.push(leg);
        }
        Ok(())
    }

    fn fold_transfer(&mut self, transfer: &TransferDetails) -> Result<(), AssessError> {
        let sent_by_sender = self.is_sender(transfer.sender.as_deref());
        let received_by_sender = self.is_sender(transfer.receiver.as_deref());
        if !sent_by_sender && !received_by_sender {
            return Ok(());
        }

        let asset = AssetId::from_optional(transfer.asset.as_deref())?;
        let amount = transfer.amount.as_u128("amount")?;

        if sent_by_sender {
            tracing::debug!("Unclassified transfer of {} {} from sender", amount, asset);
            *self.sent.entry(asset).or_default() += amount;
            self.outbound.push(Leg::unknown_sent(asset, amount));
            self.unknown += 1;
        }
        if received_by_sender {
            tracing::debug!("Unclassified transfer of {} {} to sender", amount, asset);
            *self.received.entry(asset).or_default() += amount;
            self.inbound.push(Leg::unknown_received(asset, amount));
            self.unknown += 1;
        }
        Ok(())
    }
}
