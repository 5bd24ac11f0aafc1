//! Token ledger - per-account balances and total supply
//!
//! Every change is computed first as a [`TokenPlan`] against the current
//! balances and only then applied, so a failed check never leaves a
//! half-written balance behind.

use std::collections::HashMap;

use goldbyte_types::{AccountId, Amount, LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Reject zero amounts for operations that must move value
pub(crate) fn ensure_positive(amount: Amount, operation: &str) -> Result<()> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount {
            message: format!("{} amount must be greater than zero", operation),
        });
    }
    Ok(())
}

/// A validated set of balance writes plus the resulting total supply
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a plan does nothing until applied"]
pub struct TokenPlan {
    balances: Vec<(AccountId, Amount)>,
    total_supply: Amount,
}

impl TokenPlan {
    /// Balance `account` will hold once the plan is applied
    pub fn balance_after(&self, account: &AccountId) -> Option<Amount> {
        self.balances
            .iter()
            .rev()
            .find(|(a, _)| a == account)
            .map(|(_, balance)| *balance)
    }
}

/// Balances of every account that ever held tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: HashMap<AccountId, Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account (zero if it never held tokens)
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// All accounts with a balance entry (including zero balances)
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances.iter().map(|(account, balance)| (account, *balance))
    }

    /// Sum of every balance, recomputed from scratch
    pub fn sum_balances(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, balance| acc.checked_add(*balance))
    }

    /// Plan crediting newly minted tokens
    pub fn plan_mint(&self, account: &AccountId, amount: Amount) -> Result<TokenPlan> {
        ensure_positive(amount, "Mint")?;
        let balance = self.balance_of(account).checked_add(amount)?;
        let total_supply = self.total_supply.checked_add(amount)?;
        Ok(TokenPlan {
            balances: vec![(account.clone(), balance)],
            total_supply,
        })
    }

    /// Plan burning tokens out of circulation
    pub fn plan_burn(&self, account: &AccountId, amount: Amount) -> Result<TokenPlan> {
        ensure_positive(amount, "Burn")?;
        let balance = self.debited(account, amount)?;
        let total_supply =
            self.total_supply
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::Snapshot {
                    message: format!("total supply {} below burn of {}", self.total_supply, amount),
                })?;
        Ok(TokenPlan {
            balances: vec![(account.clone(), balance)],
            total_supply,
        })
    }

    /// Plan moving balance between holders; supply is unchanged
    pub fn plan_transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<TokenPlan> {
        ensure_positive(amount, "Transfer")?;
        let from_balance = self.debited(from, amount)?;
        if from == to {
            return Ok(TokenPlan {
                balances: vec![(from.clone(), self.balance_of(from))],
                total_supply: self.total_supply,
            });
        }
        let to_balance = self.balance_of(to).checked_add(amount)?;
        Ok(TokenPlan {
            balances: vec![(from.clone(), from_balance), (to.clone(), to_balance)],
            total_supply: self.total_supply,
        })
    }

    /// Apply a plan produced by this ledger
    pub fn apply(&mut self, plan: TokenPlan) {
        for (account, balance) in plan.balances {
            self.balances.insert(account, balance);
        }
        self.total_supply = plan.total_supply;
    }

    fn debited(&self, account: &AccountId, amount: Amount) -> Result<Amount> {
        let available = self.balance_of(account);
        available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> AccountId {
        AccountId::new(id)
    }

    #[test]
    fn test_mint_and_balance() {
        let mut tokens = TokenLedger::new();
        assert_eq!(tokens.balance_of(&account("alice")), Amount::ZERO);

        let plan = tokens.plan_mint(&account("alice"), Amount::from_whole(1000)).unwrap();
        tokens.apply(plan);

        assert_eq!(tokens.balance_of(&account("alice")), Amount::from_whole(1000));
        assert_eq!(tokens.total_supply(), Amount::from_whole(1000));
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut tokens = TokenLedger::new();
        let plan = tokens.plan_mint(&account("alice"), Amount::from_whole(1000)).unwrap();
        tokens.apply(plan);

        let plan = tokens.plan_burn(&account("alice"), Amount::from_whole(400)).unwrap();
        assert_eq!(plan.balance_after(&account("alice")), Some(Amount::from_whole(600)));
        tokens.apply(plan);

        assert_eq!(tokens.total_supply(), Amount::from_whole(600));
        assert_eq!(tokens.sum_balances().unwrap(), tokens.total_supply());
    }

    #[test]
    fn test_no_negative_balance() {
        let mut tokens = TokenLedger::new();
        let plan = tokens.plan_mint(&account("alice"), Amount::from_whole(100)).unwrap();
        tokens.apply(plan);

        let result = tokens.plan_burn(&account("alice"), Amount::from_whole(200));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));

        let result = tokens.plan_transfer(&account("alice"), &account("bob"), Amount::from_whole(200));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(tokens.balance_of(&account("alice")), Amount::from_whole(100));
    }

    #[test]
    fn test_transfer() {
        let mut tokens = TokenLedger::new();
        let plan = tokens.plan_mint(&account("alice"), Amount::from_whole(1000)).unwrap();
        tokens.apply(plan);

        let plan = tokens
            .plan_transfer(&account("alice"), &account("bob"), Amount::from_whole(400))
            .unwrap();
        tokens.apply(plan);

        assert_eq!(tokens.balance_of(&account("alice")), Amount::from_whole(600));
        assert_eq!(tokens.balance_of(&account("bob")), Amount::from_whole(400));
        assert_eq!(tokens.total_supply(), Amount::from_whole(1000));
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let mut tokens = TokenLedger::new();
        let plan = tokens.plan_mint(&account("alice"), Amount::from_whole(10)).unwrap();
        tokens.apply(plan);

        let plan = tokens
            .plan_transfer(&account("alice"), &account("alice"), Amount::from_whole(10))
            .unwrap();
        tokens.apply(plan);
        assert_eq!(tokens.balance_of(&account("alice")), Amount::from_whole(10));
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let tokens = TokenLedger::new();
        assert!(matches!(
            tokens.plan_mint(&account("alice"), Amount::ZERO),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }
}
