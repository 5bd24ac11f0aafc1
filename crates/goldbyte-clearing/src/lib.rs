//! GoldByte Clearing - Multilateral netting of interbank obligations
//!
//! Every redemption through a bank other than the issuer leaves a bilateral
//! obligation in the ledger's settlement matrix. Clearing collapses the open
//! positions of all banks into net positions and a short list of
//! payment legs that settles them, and proves that no value was created or
//! lost on the way.
//!
//! Clearing is read-only: it works on a settlement report and never writes
//! to the ledger.

use goldbyte_types::SignedAmount;
use thiserror::Error;

pub mod netting;

pub use netting::{clear, ClearingLeg, ClearingPlan, ConservationProof, NetPosition};

/// Errors raised while clearing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClearingError {
    #[error("Conservation violated: net positions sum to {net_sum}")]
    ConservationViolation { net_sum: SignedAmount },

    #[error("Amount overflow while netting positions")]
    AmountOverflow,
}

pub type Result<T> = std::result::Result<T, ClearingError>;
