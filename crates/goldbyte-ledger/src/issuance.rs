//! Issuance tracking
//!
//! Per-account metadata recorded when tokens are minted: which bank issued
//! them, which bank the holder is affiliated with, the reserve class backing
//! them and when they were issued. The issuance timestamp drives
//! auto-settlement; the issuer bank and class drive redemption.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use goldbyte_types::{
    AccountId, Amount, BankCode, LedgerError, LedgerEvent, ReserveClass, Result, WalletId,
};
use serde::{Deserialize, Serialize};

use crate::state::LedgerState;
use crate::token::ensure_positive;

/// Issuance metadata of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    /// Bank that minted the tokens
    pub issuer_bank: BankCode,
    /// Bank the holder is affiliated with, if any
    pub affiliation: Option<BankCode>,
    pub reserve_class: ReserveClass,
    /// Time of the most recent issuance (or inheriting transfer)
    pub issued_at: DateTime<Utc>,
}

impl IssuanceRecord {
    /// Bank that receives the reserve when the account is auto-settled
    pub fn settlement_bank(&self) -> &BankCode {
        self.affiliation.as_ref().unwrap_or(&self.issuer_bank)
    }
}

/// Issuance metadata and fee exemptions for every account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuanceTracker {
    records: HashMap<AccountId, IssuanceRecord>,
    fee_exempt: BTreeSet<AccountId>,
}

impl IssuanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &AccountId) -> Option<&IssuanceRecord> {
        self.records.get(account)
    }

    /// Record (or overwrite) an account's issuance metadata
    pub fn record(&mut self, account: AccountId, record: IssuanceRecord) {
        self.records.insert(account, record);
    }

    pub fn is_fee_exempt(&self, account: &AccountId) -> bool {
        self.fee_exempt.contains(account)
    }

    /// Set an account's exemption flag, returning whether it changed
    pub fn set_fee_exempt(&mut self, account: &AccountId, exempt: bool) -> bool {
        if exempt {
            self.fee_exempt.insert(account.clone())
        } else {
            self.fee_exempt.remove(account)
        }
    }
}

/// Request to mint tokens against locked reserve
///
/// ```
/// use goldbyte_ledger::IssueRequest;
/// use goldbyte_types::{AccountId, Amount, BankCode, ReserveClass};
///
/// let request = IssueRequest::new(
///     AccountId::new("alice"),
///     Amount::from_whole(500),
///     BankCode::parse("LBG").unwrap(),
/// )
/// .affiliation(BankCode::parse("SBI").unwrap())
/// .reserve_class(ReserveClass::fiat());
/// assert_eq!(request.reserve_class, Some(ReserveClass::fiat()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub account: AccountId,
    pub amount: Amount,
    pub issuer_bank: BankCode,
    /// Affiliated bank; `None` routes auto-settlement to the issuer
    #[serde(default)]
    pub affiliation: Option<BankCode>,
    /// Backing class; `None` uses the configured default
    #[serde(default)]
    pub reserve_class: Option<ReserveClass>,
}

impl IssueRequest {
    pub fn new(account: AccountId, amount: Amount, issuer_bank: BankCode) -> Self {
        Self {
            account,
            amount,
            issuer_bank,
            affiliation: None,
            reserve_class: None,
        }
    }

    pub fn affiliation(mut self, bank: BankCode) -> Self {
        self.affiliation = Some(bank);
        self
    }

    pub fn reserve_class(mut self, class: ReserveClass) -> Self {
        self.reserve_class = Some(class);
        self
    }
}

impl LedgerState {
    /// Mint tokens for an account, locking the same amount of reserve.
    ///
    /// The caller must be an administrator or the issuer bank's registered
    /// settlement wallet.
    pub(crate) fn issue_tokens(
        &mut self,
        caller: &AccountId,
        request: IssueRequest,
        now: DateTime<Utc>,
    ) -> Result<IssuanceRecord> {
        let IssueRequest {
            account,
            amount,
            issuer_bank,
            affiliation,
            reserve_class,
        } = request;

        ensure_positive(amount, "Issue")?;

        let issuer_wallet = self.registry.lookup(&issuer_bank)?;
        if !self.is_admin(caller) && *issuer_wallet != WalletId::new(caller.as_str()) {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: format!("issue tokens for {}", issuer_bank),
            });
        }

        if let Some(bank) = &affiliation {
            self.registry.lookup(bank)?;
        }

        let class = reserve_class.unwrap_or_else(|| self.default_reserve_class.clone());
        if !self.reserves.is_known(&class) {
            return Err(LedgerError::UnknownReserveClass {
                class: class.to_string(),
            });
        }
        self.ensure_class_compatible(&account, &class)?;

        let reserve_plan = self.reserves.plan_lock(&class, amount)?;
        let token_plan = self.tokens.plan_mint(&account, amount)?;

        let record = IssuanceRecord {
            issuer_bank: issuer_bank.clone(),
            affiliation,
            reserve_class: class.clone(),
            issued_at: now,
        };

        self.reserves.apply(reserve_plan);
        self.tokens.apply(token_plan);
        self.issuance.record(account.clone(), record.clone());
        self.journal.append(
            LedgerEvent::TokensIssued {
                account,
                amount,
                issuer_bank,
                affiliation: record.settlement_bank().clone(),
                reserve_class: class,
            },
            now,
        );

        Ok(record)
    }

    /// Fail if `account` holds a non-zero balance backed by a class other than `class`
    pub(crate) fn ensure_class_compatible(
        &self,
        account: &AccountId,
        class: &ReserveClass,
    ) -> Result<()> {
        if self.tokens.balance_of(account).is_zero() {
            return Ok(());
        }
        match self.issuance.get(account) {
            Some(record) if record.reserve_class != *class => {
                Err(LedgerError::ReserveClassMismatch {
                    account: account.clone(),
                    held: record.reserve_class.clone(),
                    requested: class.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    fn code(s: &str) -> BankCode {
        BankCode::parse(s).unwrap()
    }

    fn state() -> LedgerState {
        let admin = AccountId::new("imf");
        let mut state = LedgerState::new(&LedgerConfig::with_admin(admin.clone()));
        state
            .register_bank(&admin, code("LBG"), WalletId::new("0xA341"), Utc::now())
            .unwrap();
        state
            .register_bank(&admin, code("SBI"), WalletId::new("0x8f48"), Utc::now())
            .unwrap();
        state
    }

    #[test]
    fn test_issue_locks_reserve_and_records_metadata() {
        let mut state = state();
        let now = Utc::now();
        let request = IssueRequest::new(AccountId::new("alice"), Amount::from_whole(500), code("LBG"))
            .affiliation(code("SBI"));

        let record = state.issue_tokens(&AccountId::new("imf"), request, now).unwrap();

        assert_eq!(record.issuer_bank, code("LBG"));
        assert_eq!(record.settlement_bank(), &code("SBI"));
        assert_eq!(record.reserve_class, ReserveClass::gold());
        assert_eq!(record.issued_at, now);
        assert_eq!(state.balance_of(&AccountId::new("alice")), Amount::from_whole(500));
        assert_eq!(state.gold_reserve(), Amount::from_whole(500));
        assert_eq!(state.journal().len(), 3);
    }

    #[test]
    fn test_issuer_wallet_may_issue() {
        let mut state = state();
        let request = IssueRequest::new(AccountId::new("alice"), Amount::from_whole(1), code("LBG"));
        assert!(state
            .issue_tokens(&AccountId::new("0xA341"), request.clone(), Utc::now())
            .is_ok());

        // Another bank's wallet may not issue on LBG's behalf
        let result = state.issue_tokens(&AccountId::new("0x8f48"), request, Utc::now());
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }

    #[test]
    fn test_issue_rejections_leave_state_untouched() {
        let mut state = state();
        let admin = AccountId::new("imf");
        let alice = AccountId::new("alice");

        let zero = IssueRequest::new(alice.clone(), Amount::ZERO, code("LBG"));
        assert!(matches!(
            state.issue_tokens(&admin, zero, Utc::now()),
            Err(LedgerError::InvalidAmount { .. })
        ));

        let unknown_issuer = IssueRequest::new(alice.clone(), Amount::from_whole(1), code("HSBC"));
        assert!(matches!(
            state.issue_tokens(&admin, unknown_issuer, Utc::now()),
            Err(LedgerError::UnknownBank { .. })
        ));

        let unknown_affiliation = IssueRequest::new(alice.clone(), Amount::from_whole(1), code("LBG"))
            .affiliation(code("HSBC"));
        assert!(matches!(
            state.issue_tokens(&admin, unknown_affiliation, Utc::now()),
            Err(LedgerError::UnknownBank { .. })
        ));

        let silver = IssueRequest::new(alice.clone(), Amount::from_whole(1), code("LBG"))
            .reserve_class(ReserveClass::parse("Silver").unwrap());
        assert!(matches!(
            state.issue_tokens(&admin, silver, Utc::now()),
            Err(LedgerError::UnknownReserveClass { .. })
        ));

        assert_eq!(state.total_supply(), Amount::ZERO);
        assert!(state.issuance_info(&alice).is_none());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_mixing_reserve_classes_is_rejected() {
        let mut state = state();
        let admin = AccountId::new("imf");
        let alice = AccountId::new("alice");

        let gold = IssueRequest::new(alice.clone(), Amount::from_whole(10), code("LBG"));
        state.issue_tokens(&admin, gold, Utc::now()).unwrap();

        let fiat = IssueRequest::new(alice.clone(), Amount::from_whole(10), code("LBG"))
            .reserve_class(ReserveClass::fiat());
        assert!(matches!(
            state.issue_tokens(&admin, fiat, Utc::now()),
            Err(LedgerError::ReserveClassMismatch { .. })
        ));
        assert_eq!(state.reserve(&ReserveClass::fiat()).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_fee_exemption_flag() {
        let mut tracker = IssuanceTracker::new();
        let alice = AccountId::new("alice");
        assert!(!tracker.is_fee_exempt(&alice));
        assert!(tracker.set_fee_exempt(&alice, true));
        assert!(!tracker.set_fee_exempt(&alice, true));
        assert!(tracker.is_fee_exempt(&alice));
        assert!(tracker.set_fee_exempt(&alice, false));
        assert!(!tracker.is_fee_exempt(&alice));
    }
}
