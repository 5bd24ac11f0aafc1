//! Bank registry
//!
//! Maps each consortium bank code to its settlement wallet and keeps the
//! codes in registration order, which settlement reports rely on for a
//! deterministic enumeration of bank pairs.

use std::collections::HashMap;

use goldbyte_types::{BankCode, LedgerError, Result, WalletId};
use serde::{Deserialize, Serialize};

/// Registry of consortium banks
///
/// Invariant: a code is in `codes` iff it has an entry in `wallets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankRegistry {
    wallets: HashMap<BankCode, WalletId>,
    codes: Vec<BankCode>,
}

impl BankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a bank's settlement wallet.
    ///
    /// Returns the wallet previously registered under the code. A code that
    /// is re-registered keeps its original position in [`Self::codes`].
    pub fn register(&mut self, code: BankCode, wallet: WalletId) -> Option<WalletId> {
        let previous = self.wallets.insert(code.clone(), wallet);
        if previous.is_none() {
            self.codes.push(code);
        }
        previous
    }

    /// Resolve a bank code to its settlement wallet
    pub fn lookup(&self, code: &BankCode) -> Result<&WalletId> {
        self.wallets.get(code).ok_or_else(|| LedgerError::UnknownBank {
            code: code.to_string(),
        })
    }

    pub fn contains(&self, code: &BankCode) -> bool {
        self.wallets.contains_key(code)
    }

    /// Known bank codes in registration order
    pub fn codes(&self) -> &[BankCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check the code list and wallet map describe the same set of banks
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.codes.len() == self.wallets.len()
            && self
                .codes
                .iter()
                .all(|code| self.wallets.contains_key(code) && seen.insert(code))
    }
}
