//! The GoldByte ledger handle
//!
//! [`GoldByteLedger`] serialises every mutation through one write lock and
//! hands readers an immutable [`LedgerState`] snapshot. A snapshot is an
//! `Arc` clone; a writer only copies the state when an older snapshot is
//! still alive.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use goldbyte_types::{AccountId, Amount, BankCode, ReserveClass, Result, SignedAmount, WalletId};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auto_settle::SettlementStatus;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::issuance::{IssuanceRecord, IssueRequest};
use crate::journal::EventRecord;
use crate::redemption::Redemption;
use crate::reserve::ReservePool;
use crate::settlement::SettlementEntry;
use crate::state::LedgerState;

/// Shared handle to one ledger
#[derive(Debug, Clone)]
pub struct GoldByteLedger {
    state: Arc<RwLock<Arc<LedgerState>>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EventRecord>,
}

impl GoldByteLedger {
    /// Create an empty ledger on the system clock
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty ledger reading time from `clock`
    pub fn with_clock(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(LedgerState::new(config), clock)
    }

    /// Resume from a stored snapshot, re-validating every invariant
    pub fn from_snapshot(state: LedgerState, clock: Arc<dyn Clock>) -> Result<Self> {
        state.check_invariants()?;
        info!(
            banks = state.bank_codes().len(),
            supply = %state.total_supply(),
            events = state.journal().len(),
            "Ledger restored from snapshot"
        );
        Ok(Self::from_parts(state, clock))
    }

    fn from_parts(state: LedgerState, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(state.event_capacity.max(1));
        Self {
            state: Arc::new(RwLock::new(Arc::new(state))),
            clock,
            events,
        }
    }

    /// Run one mutation under the write lock.
    ///
    /// Every operation validates before it writes, so an error leaves the
    /// state as it was. Journal records appended by a successful operation
    /// are published to subscribers in order.
    fn mutate<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut LedgerState, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let now = self.clock.now();
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut *guard);
        let mark = state.journal.len() as u64;

        match apply(&mut *state, now) {
            Ok(value) => {
                for record in state.journal.since(mark) {
                    // No live subscribers is fine
                    let _ = self.events.send(record.clone());
                }
                Ok(value)
            }
            Err(e) => {
                warn!(operation, kind = e.kind(), error = %e, "Ledger operation rejected");
                Err(e)
            }
        }
    }

    /// Consistent read-only view of the whole ledger
    pub fn snapshot(&self) -> Arc<LedgerState> {
        self.state.read().clone()
    }

    /// Receive every journal record committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub fn register_bank(&self, caller: &AccountId, code: BankCode, wallet: WalletId) -> Result<()> {
        let changed = self.mutate("register_bank", |state, now| {
            state.register_bank(caller, code.clone(), wallet.clone(), now)
        })?;
        if changed {
            info!(code = %code, wallet = %wallet, "Bank registered");
        }
        Ok(())
    }

    pub fn set_fee_exempt(&self, caller: &AccountId, account: &AccountId, exempt: bool) -> Result<()> {
        let changed = self.mutate("set_fee_exempt", |state, now| {
            state.set_fee_exempt(caller, account, exempt, now)
        })?;
        if changed {
            info!(account = %account, exempt, "Fee exemption changed");
        }
        Ok(())
    }

    // ========================================================================
    // Token operations
    // ========================================================================

    /// Mint tokens against locked reserve
    pub fn issue_tokens(&self, caller: &AccountId, request: IssueRequest) -> Result<IssuanceRecord> {
        let account = request.account.clone();
        let amount = request.amount;
        let record = self.mutate("issue_tokens", |state, now| {
            state.issue_tokens(caller, request, now)
        })?;
        info!(
            account = %account,
            amount = %amount,
            issuer = %record.issuer_bank,
            reserve_class = %record.reserve_class,
            "Tokens issued"
        );
        Ok(record)
    }

    pub fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        self.mutate("transfer", |state, now| state.transfer(from, to, amount, now))?;
        info!(from = %from, to = %to, amount = %amount, "Tokens transferred");
        Ok(())
    }

    /// Redeem `amount` of the caller's tokens through `redeeming_bank`
    pub fn redeem(&self, caller: &AccountId, amount: Amount, redeeming_bank: &BankCode) -> Result<Redemption> {
        let redemption = self.mutate("redeem", |state, now| {
            state.redeem(caller, amount, redeeming_bank, now)
        })?;
        info!(
            account = %caller,
            issuer = %redemption.issuer_bank,
            redeemer = %redemption.redeeming_bank,
            net = %redemption.net,
            fee = %redemption.fee,
            "Tokens redeemed"
        );
        Ok(redemption)
    }

    /// Force-redeem a stale balance. `Ok(None)` when there is nothing to settle.
    pub fn auto_settle(&self, account: &AccountId) -> Result<Option<Redemption>> {
        let settled = self.mutate("auto_settle", |state, now| state.auto_settle(account, now))?;
        match &settled {
            Some(redemption) => info!(
                account = %account,
                redeemer = %redemption.redeeming_bank,
                amount = %redemption.net,
                "Account auto-settled"
            ),
            None => debug!(account = %account, "Nothing to auto-settle"),
        }
        Ok(settled)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.snapshot().balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.snapshot().total_supply()
    }

    pub fn account_bank(&self, account: &AccountId) -> Option<BankCode> {
        self.snapshot().account_bank(account).cloned()
    }

    pub fn issuance_info(&self, account: &AccountId) -> Option<IssuanceRecord> {
        self.snapshot().issuance_info(account).cloned()
    }

    pub fn is_fee_exempt(&self, account: &AccountId) -> bool {
        self.snapshot().is_fee_exempt(account)
    }

    pub fn redeemable_balance_for(&self, account: &AccountId, redeeming_bank: &BankCode) -> Amount {
        self.snapshot().redeemable_balance_for(account, redeeming_bank)
    }

    pub fn gold_reserve(&self) -> Amount {
        self.snapshot().gold_reserve()
    }

    pub fn reserve(&self, class: &ReserveClass) -> Result<Amount> {
        self.snapshot().reserve(class)
    }

    pub fn reserve_pool(&self, class: &ReserveClass) -> Result<ReservePool> {
        self.snapshot().reserve_pool(class)
    }

    pub fn lookup_bank(&self, code: &BankCode) -> Result<WalletId> {
        self.snapshot().lookup_bank(code).cloned()
    }

    pub fn bank_codes(&self) -> Vec<BankCode> {
        self.snapshot().bank_codes().to_vec()
    }

    pub fn net_settlements(&self, issuer: &BankCode, redeemer: &BankCode) -> SignedAmount {
        self.snapshot().net_settlements(issuer, redeemer)
    }

    /// Every open bilateral position, read from one snapshot
    pub fn settlement_report(&self) -> Vec<SettlementEntry> {
        let report = self.snapshot().settlement_report();
        debug!(entries = report.len(), "Settlement report built");
        report
    }

    pub fn settlement_status(&self, account: &AccountId) -> SettlementStatus {
        self.snapshot().settlement_status(account, self.clock.now())
    }

    /// Journal records with `sequence >= from`
    pub fn journal(&self, from: u64) -> Vec<EventRecord> {
        self.snapshot().journal().since(from).to_vec()
    }

    pub fn verify_journal(&self) -> bool {
        self.snapshot().journal().verify()
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.snapshot().check_invariants()
    }
}
