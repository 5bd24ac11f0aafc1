//! GoldByte Ledger - Reserve-backed accounting engine for the GB token
//!
//! The ledger is:
//! - Reserve-backed (every token is minted against a locked unit of one reserve class)
//! - Fee-bearing (redemption keeps 0.07% of the reserve unless the holder is exempt)
//! - Interbank (redeeming through another bank records what the issuer owes it)
//! - Time-aware (balances held past ten days may be force-redeemed by anyone)
//! - Journaled (every committed mutation is appended to a hash-chained event log)
//!
//! # Invariants
//!
//! 1. `locked[class]` equals the sum of balances backed by `class`
//! 2. Total supply equals the sum of balances and the sum of locked reserve
//! 3. `net_settlements(a, b) == -net_settlements(b, a)`
//! 4. Every operation fully commits or fails without effect
//!
//! # Example
//!
//! ```
//! use goldbyte_ledger::{GoldByteLedger, IssueRequest, LedgerConfig};
//! use goldbyte_types::{AccountId, Amount, BankCode, WalletId};
//!
//! let admin = AccountId::new("imf");
//! let ledger = GoldByteLedger::new(&LedgerConfig::with_admin(admin.clone()));
//! let lbg = BankCode::parse("LBG").unwrap();
//! let sbi = BankCode::parse("SBI").unwrap();
//! ledger.register_bank(&admin, lbg.clone(), WalletId::new("0xA341")).unwrap();
//! ledger.register_bank(&admin, sbi.clone(), WalletId::new("0x8f48")).unwrap();
//!
//! let alice = AccountId::new("alice");
//! ledger
//!     .issue_tokens(&admin, IssueRequest::new(alice.clone(), Amount::from_whole(100), lbg.clone()))
//!     .unwrap();
//! let redemption = ledger.redeem(&alice, Amount::from_whole(100), &sbi).unwrap();
//!
//! assert_eq!(redemption.net.to_string(), "99.93");
//! assert_eq!(ledger.net_settlements(&lbg, &sbi).to_decimal_string(), "99.93");
//! ```

pub mod auto_settle;
pub mod clock;
pub mod config;
pub mod issuance;
pub mod journal;
pub mod ledger;
pub mod redemption;
pub mod registry;
pub mod reserve;
pub mod settlement;
pub mod state;
pub mod token;

pub use auto_settle::{hold_period, SettlementStatus, HOLD_PERIOD_SECS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LedgerConfig, DEFAULT_EVENT_CAPACITY};
pub use issuance::{IssuanceRecord, IssuanceTracker, IssueRequest};
pub use journal::{EventJournal, EventRecord, GENESIS_HASH};
pub use ledger::GoldByteLedger;
pub use redemption::{redemption_fee, Redemption, REDEMPTION_FEE_BPS};
pub use registry::BankRegistry;
pub use reserve::{ReserveAccounting, ReservePool};
pub use settlement::{SettlementEntry, SettlementLedger};
pub use state::LedgerState;
pub use token::TokenLedger;
