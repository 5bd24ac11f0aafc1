//! Error types for GoldByte
//!
//! Every failure is checked before any state is mutated, so a caller that
//! receives one of these errors may correct its inputs and retry safely.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{AccountId, Amount, ReserveClass};

/// Result type for GoldByte operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// GoldByte error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========================================================================
    // Amount Errors
    // ========================================================================

    /// Non-positive or malformed amount
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Amount overflow during arithmetic
    #[error("Amount overflow during arithmetic operation")]
    AmountOverflow,

    // ========================================================================
    // Balance & Reserve Errors
    // ========================================================================

    #[error("Insufficient balance in {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        requested: Amount,
        available: Amount,
    },

    #[error("Insufficient {class} reserve: requested {requested}, locked {available}")]
    InsufficientReserve {
        class: ReserveClass,
        requested: Amount,
        available: Amount,
    },

    /// Tokens of one reserve class cannot be mixed into a balance backed by another
    #[error("Account {account} holds {held}-backed tokens, cannot add {requested}-backed tokens")]
    ReserveClassMismatch {
        account: AccountId,
        held: ReserveClass,
        requested: ReserveClass,
    },

    #[error("Account {account} has no issuance record")]
    NotIssued { account: AccountId },

    // ========================================================================
    // Registry Errors
    // ========================================================================

    #[error("Unknown bank: {code}")]
    UnknownBank { code: String },

    #[error("Unknown reserve class: {class}")]
    UnknownReserveClass { class: String },

    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: AccountId, action: String },

    // ========================================================================
    // Auto-Settlement Errors
    // ========================================================================

    #[error("Account {account} is not eligible for auto-settlement until {eligible_after}")]
    NotYetEligible {
        account: AccountId,
        eligible_after: DateTime<Utc>,
    },

    // ========================================================================
    // Snapshot Errors
    // ========================================================================

    /// A restored snapshot violates a ledger invariant
    #[error("Invalid ledger snapshot: {message}")]
    Snapshot { message: String },
}

impl LedgerError {
    /// Stable machine-readable kind, used by callers that map errors to
    /// protocol-level responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "InvalidAmount",
            Self::AmountOverflow => "AmountOverflow",
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::InsufficientReserve { .. } => "InsufficientReserve",
            Self::ReserveClassMismatch { .. } => "ReserveClassMismatch",
            Self::NotIssued { .. } => "NotIssued",
            Self::UnknownBank { .. } => "UnknownBank",
            Self::UnknownReserveClass { .. } => "UnknownReserveClass",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::NotYetEligible { .. } => "NotYetEligible",
            Self::Snapshot { .. } => "Snapshot",
        }
    }
}
