//! Reserve accounting
//!
//! One pool per known reserve class. `locked` backs the tokens in
//! circulation and must always equal the sum of balances held against that
//! class. When tokens are redeemed the burned amount leaves `locked`: the net
//! part is released to the redeemer and the fee part is retained by the
//! consortium.

use std::collections::BTreeMap;

use goldbyte_types::{Amount, LedgerError, ReserveClass, Result};
use serde::{Deserialize, Serialize};

/// Reserve held for one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePool {
    /// Reserve backing tokens in circulation
    pub locked: Amount,
    /// Reserve kept from redemption fees, never released
    pub retained_fees: Amount,
    /// Cumulative reserve released to redeeming banks
    pub released: Amount,
}

/// A validated pool update for one class
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a plan does nothing until applied"]
pub struct ReservePlan {
    class: ReserveClass,
    pool: ReservePool,
}

/// Reserve pools keyed by class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReserveAccounting {
    pools: BTreeMap<ReserveClass, ReservePool>,
}

impl ReserveAccounting {
    /// Create empty pools for each known class
    pub fn new(classes: impl IntoIterator<Item = ReserveClass>) -> Self {
        Self {
            pools: classes
                .into_iter()
                .map(|class| (class, ReservePool::default()))
                .collect(),
        }
    }

    pub fn is_known(&self, class: &ReserveClass) -> bool {
        self.pools.contains_key(class)
    }

    pub fn pool(&self, class: &ReserveClass) -> Result<ReservePool> {
        self.pools
            .get(class)
            .copied()
            .ok_or_else(|| LedgerError::UnknownReserveClass {
                class: class.to_string(),
            })
    }

    /// Reserve currently locked against `class`
    pub fn locked(&self, class: &ReserveClass) -> Result<Amount> {
        self.pool(class).map(|pool| pool.locked)
    }

    pub fn pools(&self) -> impl Iterator<Item = (&ReserveClass, &ReservePool)> {
        self.pools.iter()
    }

    /// Sum of locked reserve across every class
    pub fn total_locked(&self) -> Result<Amount> {
        self.pools
            .values()
            .try_fold(Amount::ZERO, |acc, pool| acc.checked_add(pool.locked))
    }

    /// Plan locking reserve for newly minted tokens
    pub fn plan_lock(&self, class: &ReserveClass, amount: Amount) -> Result<ReservePlan> {
        let mut pool = self.pool(class)?;
        pool.locked = pool.locked.checked_add(amount)?;
        Ok(ReservePlan {
            class: class.clone(),
            pool,
        })
    }

    /// Plan releasing reserve for `gross` burned tokens, of which `fee` is retained.
    ///
    /// Fails with `InsufficientReserve` if less than `gross` is locked.
    pub fn plan_release(
        &self,
        class: &ReserveClass,
        gross: Amount,
        fee: Amount,
    ) -> Result<ReservePlan> {
        let mut pool = self.pool(class)?;
        let net = gross.checked_sub(fee).ok_or_else(|| LedgerError::InvalidAmount {
            message: format!("fee {} exceeds redeemed amount {}", fee, gross),
        })?;
        pool.locked =
            pool.locked
                .checked_sub(gross)
                .ok_or_else(|| LedgerError::InsufficientReserve {
                    class: class.clone(),
                    requested: gross,
                    available: pool.locked,
                })?;
        pool.retained_fees = pool.retained_fees.checked_add(fee)?;
        pool.released = pool.released.checked_add(net)?;
        Ok(ReservePlan {
            class: class.clone(),
            pool,
        })
    }

    /// Apply a plan produced by this ledger
    pub fn apply(&mut self, plan: ReservePlan) {
        self.pools.insert(plan.class, plan.pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserves() -> ReserveAccounting {
        ReserveAccounting::new([ReserveClass::gold(), ReserveClass::fiat()])
    }

    #[test]
    fn test_lock_and_release() {
        let mut reserves = reserves();
        let plan = reserves.plan_lock(&ReserveClass::gold(), Amount::from_whole(100)).unwrap();
        reserves.apply(plan);

        let fee = Amount::parse_decimal("0.07").unwrap();
        let plan = reserves
            .plan_release(&ReserveClass::gold(), Amount::from_whole(100), fee)
            .unwrap();
        reserves.apply(plan);

        let pool = reserves.pool(&ReserveClass::gold()).unwrap();
        assert_eq!(pool.locked, Amount::ZERO);
        assert_eq!(pool.retained_fees, fee);
        assert_eq!(pool.released, Amount::parse_decimal("99.93").unwrap());
        assert_eq!(reserves.locked(&ReserveClass::fiat()).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_release_more_than_locked_fails() {
        let mut reserves = reserves();
        let plan = reserves.plan_lock(&ReserveClass::fiat(), Amount::from_whole(10)).unwrap();
        reserves.apply(plan);

        let result = reserves.plan_release(&ReserveClass::fiat(), Amount::from_whole(11), Amount::ZERO);
        assert!(matches!(result, Err(LedgerError::InsufficientReserve { .. })));
        assert_eq!(reserves.locked(&ReserveClass::fiat()).unwrap(), Amount::from_whole(10));
    }

    #[test]
    fn test_unknown_class() {
        let reserves = reserves();
        let silver = ReserveClass::parse("Silver").unwrap();
        assert!(!reserves.is_known(&silver));
        assert!(matches!(
            reserves.plan_lock(&silver, Amount::from_whole(1)),
            Err(LedgerError::UnknownReserveClass { .. })
        ));
    }
}
