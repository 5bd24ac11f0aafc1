//! Auto-settlement of stale balances
//!
//! Tokens held for longer than the holding period may be force-redeemed by
//! anyone. The whole balance is redeemed fee-free through the holder's
//! affiliated bank, or the issuer bank when the holder has no affiliation.

use chrono::{DateTime, Duration, Utc};
use goldbyte_types::{AccountId, Amount, LedgerError, LedgerEvent, Result};
use serde::{Deserialize, Serialize};

use crate::redemption::Redemption;
use crate::state::LedgerState;

/// Holding period in seconds (10 days)
pub const HOLD_PERIOD_SECS: i64 = 10 * 24 * 60 * 60;

pub fn hold_period() -> Duration {
    Duration::seconds(HOLD_PERIOD_SECS)
}

/// Auto-settlement state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SettlementStatus {
    /// Within the holding period
    Active { eligible_at: DateTime<Utc> },
    /// Past the holding period; `auto_settle` will redeem the balance
    Eligible,
    /// Nothing left to settle
    Settled,
}

impl LedgerState {
    pub fn settlement_status(&self, account: &AccountId, now: DateTime<Utc>) -> SettlementStatus {
        if self.tokens.balance_of(account).is_zero() {
            return SettlementStatus::Settled;
        }
        match self.issuance.get(account) {
            Some(record) => {
                let eligible_at = record.issued_at + hold_period();
                if now > eligible_at {
                    SettlementStatus::Eligible
                } else {
                    SettlementStatus::Active { eligible_at }
                }
            }
            // Unreachable while the ledger invariants hold
            None => SettlementStatus::Eligible,
        }
    }

    /// Force-redeem an account's whole balance once the holding period has
    /// passed. Returns `None` when there is nothing to settle.
    pub(crate) fn auto_settle(
        &mut self,
        account: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<Redemption>> {
        let balance = self.tokens.balance_of(account);
        if balance.is_zero() {
            return Ok(None);
        }

        let record = self
            .issuance
            .get(account)
            .cloned()
            .ok_or_else(|| LedgerError::NotIssued {
                account: account.clone(),
            })?;

        let eligible_after = record.issued_at + hold_period();
        if now <= eligible_after {
            return Err(LedgerError::NotYetEligible {
                account: account.clone(),
                eligible_after,
            });
        }

        let redeeming_bank = record.settlement_bank().clone();
        self.registry.lookup(&redeeming_bank)?;

        let redemption = Redemption {
            account: account.clone(),
            issuer_bank: record.issuer_bank,
            redeeming_bank,
            reserve_class: record.reserve_class,
            gross: balance,
            fee: Amount::ZERO,
            net: balance,
        };
        self.execute_redemption(&redemption)?;

        self.journal.append(
            LedgerEvent::AutoSettled {
                account: account.clone(),
                redeeming_bank: redemption.redeeming_bank.clone(),
                amount: balance,
                reserve_class: redemption.reserve_class.clone(),
            },
            now,
        );
        self.journal.append(
            LedgerEvent::ReserveReleased {
                account: account.clone(),
                redeeming_bank: redemption.redeeming_bank.clone(),
                amount: balance,
                reserve_class: redemption.reserve_class.clone(),
            },
            now,
        );

        Ok(Some(redemption))
    }
}
