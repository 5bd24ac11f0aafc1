//! Interbank settlement ledger
//!
//! Tracks, for every pair of banks, how much the issuing bank owes the bank
//! that fronted a reserve release on redemption. Each unordered pair is
//! stored once under its lexically smaller code, so
//! `net_owed(a, b) == -net_owed(b, a)` holds by construction.

use std::collections::BTreeMap;

use goldbyte_types::{Amount, BankCode, Result, SignedAmount};
use serde::{Deserialize, Serialize};

/// One non-zero bilateral position in a settlement report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    /// Bank that issued the redeemed tokens
    pub issuer: BankCode,
    /// Bank that redeemed them
    pub redeemer: BankCode,
    /// Net amount `issuer` owes `redeemer` (negative if the debt runs the other way)
    pub amount: SignedAmount,
}

/// A validated update of one bilateral position
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a plan does nothing until applied"]
pub struct SettlementPlan {
    low: BankCode,
    high: BankCode,
    value: SignedAmount,
}

/// Bilateral net positions between banks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementLedger {
    /// low code -> high code -> amount `low` owes `high`
    entries: BTreeMap<BankCode, BTreeMap<BankCode, SignedAmount>>,
}

impl SettlementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed amount `issuer` owes `redeemer`
    pub fn net_owed(&self, issuer: &BankCode, redeemer: &BankCode) -> SignedAmount {
        if issuer == redeemer {
            return SignedAmount::ZERO;
        }
        let (low, high, flipped) = ordered(issuer, redeemer);
        let stored = self
            .entries
            .get(low)
            .and_then(|row| row.get(high))
            .copied()
            .unwrap_or(SignedAmount::ZERO);
        if flipped {
            // plan_record only stores negatable values
            SignedAmount::from_units(-stored.units())
        } else {
            stored
        }
    }

    /// Plan recording that `issuer` now owes `redeemer` a further `net`.
    ///
    /// Returns `None` when issuer and redeemer are the same bank: a bank
    /// owes itself nothing.
    pub fn plan_record(
        &self,
        issuer: &BankCode,
        redeemer: &BankCode,
        net: Amount,
    ) -> Result<Option<SettlementPlan>> {
        if issuer == redeemer || net.is_zero() {
            return Ok(None);
        }
        let delta = SignedAmount::try_from(net)?;
        let (low, high, flipped) = ordered(issuer, redeemer);
        let delta = if flipped { delta.checked_neg()? } else { delta };
        let current = self
            .entries
            .get(low)
            .and_then(|row| row.get(high))
            .copied()
            .unwrap_or(SignedAmount::ZERO);
        let value = current.checked_add(delta)?;
        value.checked_neg()?;
        Ok(Some(SettlementPlan {
            low: low.clone(),
            high: high.clone(),
            value,
        }))
    }

    /// Apply a plan produced by this ledger
    pub fn apply(&mut self, plan: SettlementPlan) {
        self.entries
            .entry(plan.low)
            .or_default()
            .insert(plan.high, plan.value);
    }

    /// Every non-zero position between distinct known banks.
    ///
    /// Enumerates all ordered pairs of `codes` (issuer-major, in the order
    /// given), so each open bilateral position appears twice with opposite
    /// signs.
    pub fn report(&self, codes: &[BankCode]) -> Vec<SettlementEntry> {
        let mut entries = Vec::new();
        for issuer in codes {
            for redeemer in codes {
                if issuer == redeemer {
                    continue;
                }
                let amount = self.net_owed(issuer, redeemer);
                if !amount.is_zero() {
                    entries.push(SettlementEntry {
                        issuer: issuer.clone(),
                        redeemer: redeemer.clone(),
                        amount,
                    });
                }
            }
        }
        entries
    }

    /// Stored positions, one per bank pair
    pub fn positions(&self) -> impl Iterator<Item = (&BankCode, &BankCode, SignedAmount)> {
        self.entries
            .iter()
            .flat_map(|(low, row)| row.iter().map(move |(high, value)| (low, high, *value)))
    }

    /// Check every position is stored once, under its smaller code
    pub fn is_consistent(&self) -> bool {
        self.positions()
            .all(|(low, high, value)| low < high && value.checked_neg().is_ok())
    }
}

fn ordered<'a>(a: &'a BankCode, b: &'a BankCode) -> (&'a BankCode, &'a BankCode, bool) {
    if a < b {
        (a, b, false)
    } else {
        (b, a, true)
    }
}
