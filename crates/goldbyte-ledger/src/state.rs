//! Ledger state
//!
//! [`LedgerState`] owns every component of the ledger. Operations that touch
//! more than one component live next to the component they are about
//! (`issuance`, `redemption`, `auto_settle`) as further `impl LedgerState`
//! blocks; this module holds construction, views, administration, transfer
//! and the invariant check run when a snapshot is restored.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use goldbyte_types::{
    AccountId, Amount, BankCode, LedgerError, LedgerEvent, ReserveClass, Result, SignedAmount,
    WalletId,
};
use serde::{Deserialize, Serialize};

use crate::config::{default_event_capacity, LedgerConfig};
use crate::issuance::{IssuanceRecord, IssuanceTracker};
use crate::journal::EventJournal;
use crate::registry::BankRegistry;
use crate::reserve::{ReserveAccounting, ReservePool};
use crate::settlement::{SettlementEntry, SettlementLedger};
use crate::token::TokenLedger;

/// The complete state of one GoldByte ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub(crate) admins: BTreeSet<AccountId>,
    pub(crate) default_reserve_class: ReserveClass,
    pub(crate) registry: BankRegistry,
    pub(crate) tokens: TokenLedger,
    pub(crate) reserves: ReserveAccounting,
    pub(crate) issuance: IssuanceTracker,
    pub(crate) settlement: SettlementLedger,
    pub(crate) journal: EventJournal,
    /// Live subscriber buffer, kept so a restored ledger uses the configured size
    #[serde(default = "default_event_capacity")]
    pub(crate) event_capacity: usize,
}

impl LedgerState {
    /// Empty ledger: no banks, zero reserves, zero supply
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            admins: config.admins.iter().cloned().collect(),
            default_reserve_class: config.default_reserve_class.clone(),
            registry: BankRegistry::new(),
            tokens: TokenLedger::new(),
            reserves: ReserveAccounting::new(config.reserve_classes.iter().cloned()),
            issuance: IssuanceTracker::new(),
            settlement: SettlementLedger::new(),
            journal: EventJournal::new(),
            event_capacity: config.event_capacity,
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn is_admin(&self, account: &AccountId) -> bool {
        self.admins.contains(account)
    }

    pub fn default_reserve_class(&self) -> &ReserveClass {
        &self.default_reserve_class
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.tokens.balance_of(account)
    }

    /// Accounts that ever held tokens, with their balances, in id order
    pub fn accounts(&self) -> Vec<(AccountId, Amount)> {
        let mut accounts: Vec<_> = self
            .tokens
            .accounts()
            .map(|(account, balance)| (account.clone(), balance))
            .collect();
        accounts.sort();
        accounts
    }

    pub fn total_supply(&self) -> Amount {
        self.tokens.total_supply()
    }

    /// The bank an account settles through: its affiliation, or the issuer
    /// bank when it has none
    pub fn account_bank(&self, account: &AccountId) -> Option<&BankCode> {
        self.issuance.get(account).map(IssuanceRecord::settlement_bank)
    }

    pub fn issuance_info(&self, account: &AccountId) -> Option<&IssuanceRecord> {
        self.issuance.get(account)
    }

    pub fn is_fee_exempt(&self, account: &AccountId) -> bool {
        self.issuance.is_fee_exempt(account)
    }

    /// Reserve locked against `class`
    pub fn reserve(&self, class: &ReserveClass) -> Result<Amount> {
        self.reserves.locked(class)
    }

    /// Reserve locked against gold (zero if gold is not a configured class)
    pub fn gold_reserve(&self) -> Amount {
        self.reserves
            .locked(&ReserveClass::gold())
            .unwrap_or(Amount::ZERO)
    }

    pub fn reserve_pool(&self, class: &ReserveClass) -> Result<ReservePool> {
        self.reserves.pool(class)
    }

    pub fn reserve_pools(&self) -> Vec<(ReserveClass, ReservePool)> {
        self.reserves
            .pools()
            .map(|(class, pool)| (class.clone(), *pool))
            .collect()
    }

    pub fn lookup_bank(&self, code: &BankCode) -> Result<&WalletId> {
        self.registry.lookup(code)
    }

    /// Registered bank codes in registration order
    pub fn bank_codes(&self) -> &[BankCode] {
        self.registry.codes()
    }

    /// Signed amount `issuer` owes `redeemer`
    pub fn net_settlements(&self, issuer: &BankCode, redeemer: &BankCode) -> SignedAmount {
        self.settlement.net_owed(issuer, redeemer)
    }

    /// Every non-zero bilateral position, issuer-major in registration order
    pub fn settlement_report(&self) -> Vec<SettlementEntry> {
        self.settlement.report(self.registry.codes())
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub(crate) fn ensure_admin(&self, caller: &AccountId, action: &str) -> Result<()> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: action.to_string(),
            })
        }
    }

    /// Register or replace a bank's settlement wallet. Returns whether
    /// anything changed.
    pub(crate) fn register_bank(
        &mut self,
        caller: &AccountId,
        code: BankCode,
        wallet: WalletId,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.ensure_admin(caller, "register banks")?;

        let current = self.registry.lookup(&code).ok();
        if current == Some(&wallet) {
            return Ok(false);
        }

        let replaced = self.registry.register(code.clone(), wallet.clone());
        self.journal.append(
            LedgerEvent::BankRegistered {
                code,
                wallet,
                replaced,
            },
            now,
        );
        Ok(true)
    }

    /// Grant or revoke an account's redemption fee exemption. Returns
    /// whether the flag changed.
    pub(crate) fn set_fee_exempt(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        exempt: bool,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.ensure_admin(caller, "change fee exemptions")?;

        if !self.issuance.set_fee_exempt(account, exempt) {
            return Ok(false);
        }
        self.journal.append(
            LedgerEvent::FeeExemptionChanged {
                account: account.clone(),
                exempt,
            },
            now,
        );
        Ok(true)
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    /// Move balance between holders. Pools and the sender's metadata are
    /// untouched. A recipient with an empty balance takes the sender's issuer
    /// bank and reserve class, restarting its holding period; a recipient
    /// that already holds tokens keeps its metadata and must share the class.
    pub(crate) fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let token_plan = self.tokens.plan_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }

        let sender = self
            .issuance
            .get(from)
            .ok_or_else(|| LedgerError::NotIssued {
                account: from.clone(),
            })?;

        let inherited = if self.tokens.balance_of(to).is_zero() {
            Some(inherit(sender, now))
        } else {
            self.ensure_class_compatible(to, &sender.reserve_class)?;
            None
        };

        self.tokens.apply(token_plan);
        if let Some(record) = inherited {
            self.issuance.record(to.clone(), record);
        }
        self.journal.append(
            LedgerEvent::Transferred {
                from: from.clone(),
                to: to.clone(),
                amount,
            },
            now,
        );
        Ok(())
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check every ledger invariant, reporting the first violation found
    pub fn check_invariants(&self) -> Result<()> {
        let mut backed: HashMap<&ReserveClass, Amount> = HashMap::new();
        for (account, balance) in self.tokens.accounts() {
            if balance.is_zero() {
                continue;
            }
            let record = self.issuance.get(account).ok_or_else(|| {
                violation(format!("{} holds {} without an issuance record", account, balance))
            })?;
            let sum = backed.entry(&record.reserve_class).or_insert(Amount::ZERO);
            *sum = sum.checked_add(balance)?;
        }

        for (class, pool) in self.reserves.pools() {
            let held = backed.remove(class).unwrap_or(Amount::ZERO);
            if pool.locked != held {
                return Err(violation(format!(
                    "{} reserve locks {} but balances hold {}",
                    class, pool.locked, held
                )));
            }
        }
        if let Some((class, held)) = backed.into_iter().next() {
            return Err(violation(format!(
                "{} of balances are backed by unknown class {}",
                held, class
            )));
        }

        let sum_balances = self.tokens.sum_balances()?;
        let total_locked = self.reserves.total_locked()?;
        let supply = self.tokens.total_supply();
        if supply != sum_balances || supply != total_locked {
            return Err(violation(format!(
                "total supply {} differs from balances {} or locked reserve {}",
                supply, sum_balances, total_locked
            )));
        }

        if !self.registry.is_consistent() {
            return Err(violation("bank registry list and wallet map disagree".to_string()));
        }
        if !self.settlement.is_consistent() {
            return Err(violation("settlement positions are not normalised".to_string()));
        }
        if !self.journal.verify() {
            return Err(violation("event journal hash chain is broken".to_string()));
        }
        Ok(())
    }
}

fn inherit(sender: &IssuanceRecord, now: DateTime<Utc>) -> IssuanceRecord {
    IssuanceRecord {
        issuer_bank: sender.issuer_bank.clone(),
        affiliation: None,
        reserve_class: sender.reserve_class.clone(),
        issued_at: now,
    }
}

fn violation(message: String) -> LedgerError {
    LedgerError::Snapshot { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::IssueRequest;

    fn code(s: &str) -> BankCode {
        BankCode::parse(s).unwrap()
    }

    fn admin() -> AccountId {
        AccountId::new("imf")
    }

    fn state() -> LedgerState {
        let mut state = LedgerState::new(&LedgerConfig::with_admin(admin()));
        state
            .register_bank(&admin(), code("LBG"), WalletId::new("0xA341"), Utc::now())
            .unwrap();
        state
            .register_bank(&admin(), code("SBI"), WalletId::new("0x8f48"), Utc::now())
            .unwrap();
        state
    }

    fn issue(state: &mut LedgerState, account: &str, whole: u64, class: ReserveClass) {
        let request = IssueRequest::new(AccountId::new(account), Amount::from_whole(whole), code("LBG"))
            .affiliation(code("SBI"))
            .reserve_class(class);
        state.issue_tokens(&admin(), request, Utc::now()).unwrap();
    }

    #[test]
    fn test_register_bank_requires_admin() {
        let mut state = state();
        let result = state.register_bank(
            &AccountId::new("mallory"),
            code("HSBC"),
            WalletId::new("0x1"),
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert_eq!(state.bank_codes().len(), 2);
    }

    #[test]
    fn test_reregistering_same_wallet_emits_nothing() {
        let mut state = state();
        let before = state.journal().len();
        let changed = state
            .register_bank(&admin(), code("LBG"), WalletId::new("0xA341"), Utc::now())
            .unwrap();
        assert!(!changed);
        assert_eq!(state.journal().len(), before);

        let changed = state
            .register_bank(&admin(), code("LBG"), WalletId::new("0xB000"), Utc::now())
            .unwrap();
        assert!(changed);
        assert_eq!(state.lookup_bank(&code("LBG")).unwrap().as_str(), "0xB000");
        assert_eq!(state.bank_codes()[0], code("LBG"));
    }

    #[test]
    fn test_set_fee_exempt_requires_admin() {
        let mut state = state();
        let alice = AccountId::new("alice");
        assert!(matches!(
            state.set_fee_exempt(&alice, &alice, true, Utc::now()),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(state.set_fee_exempt(&admin(), &alice, true, Utc::now()).unwrap());
        assert!(state.is_fee_exempt(&alice));
    }

    #[test]
    fn test_transfer_inherits_sender_metadata() {
        let mut state = state();
        issue(&mut state, "alice", 100, ReserveClass::fiat());
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        let now = Utc::now();
        state.transfer(&alice, &bob, Amount::from_whole(40), now).unwrap();

        let record = state.issuance_info(&bob).unwrap();
        assert_eq!(record.issuer_bank, code("LBG"));
        assert_eq!(record.reserve_class, ReserveClass::fiat());
        assert_eq!(record.affiliation, None);
        assert_eq!(record.issued_at, now);
        assert_eq!(state.account_bank(&alice), Some(&code("SBI")));
        assert_eq!(state.reserve(&ReserveClass::fiat()).unwrap(), Amount::from_whole(100));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_transfer_to_emptied_account_replaces_stale_metadata() {
        let mut state = state();
        let start = Utc::now();
        let bob = AccountId::new("bob");
        let alice = AccountId::new("alice");

        let request = IssueRequest::new(bob.clone(), Amount::from_whole(10), code("SBI"));
        state.issue_tokens(&admin(), request, start).unwrap();
        state.redeem(&bob, Amount::from_whole(10), &code("SBI"), start).unwrap();

        let later = start + chrono::Duration::days(20);
        let request = IssueRequest::new(alice.clone(), Amount::from_whole(50), code("LBG"));
        state.issue_tokens(&admin(), request, later).unwrap();
        state.transfer(&alice, &bob, Amount::from_whole(50), later).unwrap();

        let record = state.issuance_info(&bob).unwrap();
        assert_eq!(record.issuer_bank, code("LBG"));
        assert_eq!(record.issued_at, later);
        assert!(matches!(
            state.auto_settle(&bob, later + chrono::Duration::seconds(1)),
            Err(LedgerError::NotYetEligible { .. })
        ));

        state.redeem(&bob, Amount::from_whole(50), &code("SBI"), later).unwrap();
        assert!(state.net_settlements(&code("LBG"), &code("SBI")).is_positive());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_account_bank_falls_back_to_issuer() {
        let mut state = state();
        let carol = AccountId::new("carol");
        let request = IssueRequest::new(carol.clone(), Amount::from_whole(5), code("LBG"));
        state.issue_tokens(&admin(), request, Utc::now()).unwrap();

        assert_eq!(state.issuance_info(&carol).unwrap().affiliation, None);
        assert_eq!(state.account_bank(&carol), Some(&code("LBG")));
        assert_eq!(state.account_bank(&AccountId::new("nobody")), None);
    }

    #[test]
    fn test_transfer_across_classes_is_rejected() {
        let mut state = state();
        issue(&mut state, "alice", 100, ReserveClass::gold());
        issue(&mut state, "bob", 100, ReserveClass::fiat());

        let result = state.transfer(
            &AccountId::new("alice"),
            &AccountId::new("bob"),
            Amount::from_whole(1),
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::ReserveClassMismatch { .. })));
        assert_eq!(state.balance_of(&AccountId::new("alice")), Amount::from_whole(100));
    }

    #[test]
    fn test_transfer_failures_leave_state_untouched() {
        let mut state = state();
        issue(&mut state, "alice", 100, ReserveClass::gold());
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        let before = state.journal().len();

        assert!(matches!(
            state.transfer(&alice, &bob, Amount::from_whole(101), Utc::now()),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            state.transfer(&alice, &bob, Amount::ZERO, Utc::now()),
            Err(LedgerError::InvalidAmount { .. })
        ));
        state.transfer(&alice, &alice, Amount::from_whole(5), Utc::now()).unwrap();

        assert_eq!(state.journal().len(), before);
        assert!(state.issuance_info(&bob).is_none());
    }

    #[test]
    fn test_tampered_state_fails_invariants() {
        let mut state = state();
        issue(&mut state, "alice", 100, ReserveClass::gold());

        let plan = state
            .reserves
            .plan_lock(&ReserveClass::gold(), Amount::from_whole(1))
            .unwrap();
        state.reserves.apply(plan);

        assert!(matches!(
            state.check_invariants(),
            Err(LedgerError::Snapshot { .. })
        ));
    }
}
