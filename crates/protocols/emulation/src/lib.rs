//! Swap Route Emulation & Assessment
//!
//! Reconciles an emulator's trace of a packed aggregator route into a
//! normalized outcome (amount received, gas spent, loss ratio) that is
//! comparable across aggregators.

pub mod analyzer;
pub mod asset;
pub mod assess;
pub mod metadata;
pub mod request;
pub mod state;
pub mod trace;

// Re-exports
pub use analyzer::{analyze, AnalyzerOutput, BalanceSnapshot, RequestedInput};
pub use asset::{parse_account, AssetId};
pub use assess::{assess, assess_emulation, AssessmentRecord, Diagnostics, PriceTable};
pub use metadata::{MetadataCache, TokenInfo, TokenMetadata, DEFAULT_DECIMALS, UNKNOWN_SYMBOL};
pub use request::{format_units, AggregatorKind, EmulationRequest, QuoteUnit, SwapRequest};
pub use state::{
    AccountState, AccountStateRef, Action, DexTransfer, EmulationResult, Leg, MessageRef,
    Numeric, PeerSwap, SwapDetails, TraceNode, Transaction, TransferDetails, UNKNOWN_DEX,
};
pub use trace::TraceStats;
