//! Error types for swapbench

use thiserror::Error;

/// Core errors that can occur while building or assessing a swap route
#[derive(Debug, Error)]
pub enum Error {
    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("Assessment error: {0}")]
    Assessment(#[from] AssessError),
}

/// Coarse error taxonomy shared by the builder, analyzer and aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedAddress,
    TooManyTransfers,
    SerializationFailure,
    AccountNotFound,
    MalformedEmulationResult,
    MissingPrice,
}

/// External message building errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Route has no transfers")]
    NoTransfers,

    #[error("Too many transfers: {count} exceeds wallet capacity of {max}")]
    TooManyTransfers { count: usize, max: usize },

    #[error("Invalid transfer amount: {value}")]
    InvalidAmount { value: String },

    #[error("Failed to serialize message: {message}")]
    SerializationFailed { message: String },
}

/// Emulation analysis and outcome aggregation errors
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Malformed address: {address}")]
    MalformedAddress { address: String },

    #[error("Account {account} does not appear in the emulation result")]
    AccountNotFound { account: String },

    #[error("Malformed emulation result: {reason}")]
    MalformedEmulationResult { reason: String },

    #[error("No price available for asset {asset}")]
    MissingPrice { asset: String },

    #[error("No decimals known for asset {asset}")]
    MissingDecimals { asset: String },
}

impl Error {
    /// Classify this error into the shared taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transaction(e) => e.kind(),
            Self::Assessment(e) => e.kind(),
        }
    }
}

impl TxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress { .. } => ErrorKind::MalformedAddress,
            Self::TooManyTransfers { .. } | Self::NoTransfers => ErrorKind::TooManyTransfers,
            Self::InvalidAmount { .. } | Self::SerializationFailed { .. } => {
                ErrorKind::SerializationFailure
            }
        }
    }

    /// Get a storage-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::NoTransfers => "no_transfers",
            Self::TooManyTransfers { .. } => "too_many_transfers",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::SerializationFailed { .. } => "serialization_failed",
        }
    }
}

impl AssessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedAddress { .. } => ErrorKind::MalformedAddress,
            Self::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            Self::MalformedEmulationResult { .. } => ErrorKind::MalformedEmulationResult,
            Self::MissingPrice { .. } | Self::MissingDecimals { .. } => ErrorKind::MissingPrice,
        }
    }

    /// Get a storage-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedAddress { .. } => "malformed_address",
            Self::AccountNotFound { .. } => "account_not_found",
            Self::MalformedEmulationResult { .. } => "malformed_emulation_result",
            Self::MissingPrice { .. } => "missing_price",
            Self::MissingDecimals { .. } => "missing_decimals",
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEmulationResult {
            reason: reason.into(),
        }
    }
}
