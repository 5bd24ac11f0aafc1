//! GoldByte Types - Canonical domain types for the reserve-backed GB ledger
//!
//! This crate contains the foundational types shared by every GoldByte crate,
//! with zero dependencies on other goldbyte crates:
//!
//! - Fixed-point amounts with 18-decimal precision ([`Amount`], [`SignedAmount`])
//! - Identifiers for accounts, banks and settlement wallets
//! - Reserve classes backing issued tokens
//! - The ledger error taxonomy
//! - Events emitted for every committed mutation
//!
//! # Ledger Invariants
//!
//! These types support the invariants the ledger enforces:
//!
//! 1. Every unit in circulation is backed by a locked unit of its reserve class
//! 2. Total supply always equals the sum of all account balances
//! 3. Interbank obligations are antisymmetric: what A owes B, B is owed by A
//! 4. Failure is explicit and leaves no partial effects

pub mod amount;
pub mod identity;
pub mod reserve;
pub mod event;
pub mod error;

pub use amount::*;
pub use identity::*;
pub use reserve::*;
pub use event::*;
pub use error::*;

/// Version of the GoldByte types schema
pub const TYPES_VERSION: &str = "0.1.0";

/// Token name
pub const TOKEN_NAME: &str = "GoldByte";

/// Token symbol
pub const TOKEN_SYMBOL: &str = "GB";
