//! Ledger events
//!
//! One event (or, for a zero-fee redemption, two) is emitted for every
//! committed mutation. Events carry no timestamp of their own; the journal
//! stamps them when they are recorded.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, BankCode, ReserveClass, WalletId};

/// Events emitted by committed ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// A bank's settlement wallet was registered or replaced
    BankRegistered {
        code: BankCode,
        wallet: WalletId,
        replaced: Option<WalletId>,
    },

    /// An account's redemption fee exemption was toggled
    FeeExemptionChanged { account: AccountId, exempt: bool },

    /// Tokens minted against locked reserve
    TokensIssued {
        account: AccountId,
        amount: Amount,
        issuer_bank: BankCode,
        affiliation: BankCode,
        reserve_class: ReserveClass,
    },

    /// Balance moved between holders
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },

    /// Tokens burned and reserve released through a redeeming bank
    Redeemed {
        account: AccountId,
        issuer_bank: BankCode,
        redeeming_bank: BankCode,
        net: Amount,
        fee: Amount,
        reserve_class: ReserveClass,
    },

    /// Reserve released in full, with no fee retained
    ReserveReleased {
        account: AccountId,
        redeeming_bank: BankCode,
        amount: Amount,
        reserve_class: ReserveClass,
    },

    /// A stale balance was force-redeemed after the holding period
    AutoSettled {
        account: AccountId,
        redeeming_bank: BankCode,
        amount: Amount,
        reserve_class: ReserveClass,
    },
}

impl LedgerEvent {
    /// Short event name, matching the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::BankRegistered { .. } => "BankRegistered",
            Self::FeeExemptionChanged { .. } => "FeeExemptionChanged",
            Self::TokensIssued { .. } => "TokensIssued",
            Self::Transferred { .. } => "Transferred",
            Self::Redeemed { .. } => "Redeemed",
            Self::ReserveReleased { .. } => "ReserveReleased",
            Self::AutoSettled { .. } => "AutoSettled",
        }
    }

    /// The token holder this event concerns, if any
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Self::BankRegistered { .. } => None,
            Self::FeeExemptionChanged { account, .. }
            | Self::TokensIssued { account, .. }
            | Self::Redeemed { account, .. }
            | Self::ReserveReleased { account, .. }
            | Self::AutoSettled { account, .. } => Some(account),
            Self::Transferred { from, .. } => Some(from),
        }
    }
}
