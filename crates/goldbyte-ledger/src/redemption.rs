//! Redemption engine
//!
//! Redeeming burns tokens and releases the backing reserve through a
//! redeeming bank. Unless the holder is fee-exempt, 0.07% of the redeemed
//! amount is kept by the consortium as reserve; the rest is released and
//! recorded as an obligation of the issuing bank towards the redeeming bank.

use chrono::{DateTime, Utc};
use goldbyte_types::{AccountId, Amount, BankCode, LedgerError, LedgerEvent, ReserveClass, Result};
use serde::{Deserialize, Serialize};

use crate::state::LedgerState;
use crate::token::ensure_positive;

/// Redemption fee in basis points (7 bps = 0.07%)
pub const REDEMPTION_FEE_BPS: u32 = 7;

/// Fee charged on redeeming `amount`, truncated toward zero
pub fn redemption_fee(amount: Amount) -> Amount {
    amount.basis_points(REDEMPTION_FEE_BPS)
}

/// Outcome of a committed redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub account: AccountId,
    pub issuer_bank: BankCode,
    pub redeeming_bank: BankCode,
    pub reserve_class: ReserveClass,
    /// Tokens burned
    pub gross: Amount,
    /// Reserve retained as fee
    pub fee: Amount,
    /// Reserve released to the redeeming bank
    pub net: Amount,
}

impl LedgerState {
    /// Burn `amount` of `account`'s tokens and release reserve through `redeeming_bank`
    pub(crate) fn redeem(
        &mut self,
        account: &AccountId,
        amount: Amount,
        redeeming_bank: &BankCode,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        ensure_positive(amount, "Redeem")?;

        let available = self.tokens.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available,
            });
        }

        let record = self
            .issuance
            .get(account)
            .cloned()
            .ok_or_else(|| LedgerError::NotIssued {
                account: account.clone(),
            })?;
        self.registry.lookup(redeeming_bank)?;

        let fee = if self.issuance.is_fee_exempt(account) {
            Amount::ZERO
        } else {
            redemption_fee(amount)
        };
        let net = amount.checked_sub(fee).ok_or(LedgerError::AmountOverflow)?;

        let redemption = Redemption {
            account: account.clone(),
            issuer_bank: record.issuer_bank,
            redeeming_bank: redeeming_bank.clone(),
            reserve_class: record.reserve_class,
            gross: amount,
            fee,
            net,
        };
        // Insufficient reserve only surfaces here, from a pool that no longer
        // backs the balances held against it
        self.execute_redemption(&redemption)?;

        self.journal.append(
            LedgerEvent::Redeemed {
                account: redemption.account.clone(),
                issuer_bank: redemption.issuer_bank.clone(),
                redeeming_bank: redemption.redeeming_bank.clone(),
                net,
                fee,
                reserve_class: redemption.reserve_class.clone(),
            },
            now,
        );
        if fee.is_zero() {
            self.journal.append(
                LedgerEvent::ReserveReleased {
                    account: redemption.account.clone(),
                    redeeming_bank: redemption.redeeming_bank.clone(),
                    amount: net,
                    reserve_class: redemption.reserve_class.clone(),
                },
                now,
            );
        }

        Ok(redemption)
    }

    /// Plan every write of a redemption, then apply them in order:
    /// reserve pool, account, settlement entry.
    pub(crate) fn execute_redemption(&mut self, redemption: &Redemption) -> Result<()> {
        let reserve_plan = self.reserves.plan_release(
            &redemption.reserve_class,
            redemption.gross,
            redemption.fee,
        )?;
        let token_plan = self.tokens.plan_burn(&redemption.account, redemption.gross)?;
        let settlement_plan = self.settlement.plan_record(
            &redemption.issuer_bank,
            &redemption.redeeming_bank,
            redemption.net,
        )?;

        self.reserves.apply(reserve_plan);
        self.tokens.apply(token_plan);
        if let Some(plan) = settlement_plan {
            self.settlement.apply(plan);
        }
        Ok(())
    }

    /// Amount `account` could redeem at `redeeming_bank` right now
    pub fn redeemable_balance_for(&self, account: &AccountId, redeeming_bank: &BankCode) -> Amount {
        if self.registry.contains(redeeming_bank) {
            self.tokens.balance_of(account)
        } else {
            Amount::ZERO
        }
    }
}
