//! Multilateral netting algorithm

use std::collections::BTreeMap;

use goldbyte_ledger::SettlementEntry;
use goldbyte_types::{Amount, BankCode, SignedAmount};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{ClearingError, Result};

/// One payment that settles part of the net positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingLeg {
    pub from: BankCode,
    pub to: BankCode,
    pub amount: Amount,
}

/// A bank's net position across all counterparties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPosition {
    pub bank: BankCode,
    /// Positive when the bank is owed, negative when it owes
    pub net: SignedAmount,
}

/// Evidence that netting conserved value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConservationProof {
    /// SHA-256 over the net positions, in bank order
    pub positions_hash: String,
    pub net_sum: SignedAmount,
    /// The legs settle every net position exactly
    pub verified: bool,
}

/// Result of clearing a settlement report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingPlan {
    /// Bilateral obligations that went in
    pub gross_obligations: u64,
    /// Share of payments saved by netting (1.0 when nothing had to move)
    pub efficiency: f64,
    pub positions: Vec<NetPosition>,
    pub legs: Vec<ClearingLeg>,
    pub conservation_proof: ConservationProof,
}

impl ClearingPlan {
    pub fn net_legs(&self) -> u64 {
        self.legs.len() as u64
    }

    /// Check the legs settle every position exactly
    pub fn verify(&self) -> bool {
        legs_settle(&self.positions, &self.legs)
    }
}

/// Clear the open obligations of a settlement report.
///
/// Only positive entries are taken, so a report listing each bilateral
/// position in both directions counts every obligation once.
pub fn clear(entries: &[SettlementEntry]) -> Result<ClearingPlan> {
    // 1. Net every bank across all of its counterparties
    let mut net_amounts: BTreeMap<BankCode, i128> = BTreeMap::new();
    let mut gross_obligations = 0u64;

    for entry in entries.iter().filter(|e| e.amount.is_positive()) {
        let amount = entry.amount.units();
        adjust(&mut net_amounts, &entry.issuer, -amount)?;
        adjust(&mut net_amounts, &entry.redeemer, amount)?;
        gross_obligations += 1;
    }

    // 2. Conservation: what is owed equals what is due
    let net_sum = net_amounts
        .values()
        .try_fold(0i128, |acc, v| acc.checked_add(*v))
        .ok_or(ClearingError::AmountOverflow)?;
    if net_sum != 0 {
        return Err(ClearingError::ConservationViolation {
            net_sum: SignedAmount::from_units(net_sum),
        });
    }

    let positions: Vec<NetPosition> = net_amounts
        .iter()
        .filter(|(_, net)| **net != 0)
        .map(|(bank, net)| NetPosition {
            bank: bank.clone(),
            net: SignedAmount::from_units(*net),
        })
        .collect();

    // 3. Greedy matching of payers against receivers, in bank order
    let mut payers: Vec<(&BankCode, u128)> = positions
        .iter()
        .filter(|p| p.net.is_negative())
        .map(|p| (&p.bank, p.net.magnitude().units()))
        .collect();
    let mut receivers: Vec<(&BankCode, u128)> = positions
        .iter()
        .filter(|p| p.net.is_positive())
        .map(|p| (&p.bank, p.net.magnitude().units()))
        .collect();

    let mut legs = Vec::new();
    let mut payer_idx = 0;
    let mut receiver_idx = 0;

    while payer_idx < payers.len() && receiver_idx < receivers.len() {
        let amount = payers[payer_idx].1.min(receivers[receiver_idx].1);

        legs.push(ClearingLeg {
            from: payers[payer_idx].0.clone(),
            to: receivers[receiver_idx].0.clone(),
            amount: Amount::from_units(amount),
        });

        payers[payer_idx].1 -= amount;
        receivers[receiver_idx].1 -= amount;

        if payers[payer_idx].1 == 0 {
            payer_idx += 1;
        }
        if receivers[receiver_idx].1 == 0 {
            receiver_idx += 1;
        }
    }

    // 4. Efficiency and proof
    let efficiency = if gross_obligations > 0 {
        1.0 - (legs.len() as f64 / gross_obligations as f64)
    } else {
        1.0
    };

    let conservation_proof = ConservationProof {
        positions_hash: positions_hash(&positions),
        net_sum: SignedAmount::ZERO,
        verified: legs_settle(&positions, &legs),
    };
    if !conservation_proof.verified {
        return Err(ClearingError::ConservationViolation {
            net_sum: SignedAmount::ZERO,
        });
    }

    info!(
        gross = gross_obligations,
        net = legs.len(),
        efficiency,
        "Settlement positions cleared"
    );

    Ok(ClearingPlan {
        gross_obligations,
        efficiency,
        positions,
        legs,
        conservation_proof,
    })
}

fn adjust(net_amounts: &mut BTreeMap<BankCode, i128>, bank: &BankCode, delta: i128) -> Result<()> {
    let net = net_amounts.entry(bank.clone()).or_insert(0);
    *net = net.checked_add(delta).ok_or(ClearingError::AmountOverflow)?;
    Ok(())
}

fn positions_hash(positions: &[NetPosition]) -> String {
    let mut hasher = Sha256::new();
    for position in positions {
        hasher.update(format!("{}:{}\n", position.bank, position.net.units()).as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Replay the legs against the positions; every bank must end at zero
fn legs_settle(positions: &[NetPosition], legs: &[ClearingLeg]) -> bool {
    let mut remaining: BTreeMap<&BankCode, i128> = positions
        .iter()
        .map(|p| (&p.bank, p.net.units()))
        .collect();

    for leg in legs {
        let Ok(amount) = i128::try_from(leg.amount.units()) else {
            return false;
        };
        match remaining.get_mut(&leg.from) {
            Some(net) => *net += amount,
            None => return false,
        }
        match remaining.get_mut(&leg.to) {
            Some(net) => *net -= amount,
            None => return false,
        }
    }
    remaining.values().all(|net| *net == 0)
}
