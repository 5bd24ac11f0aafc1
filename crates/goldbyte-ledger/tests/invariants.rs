use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use goldbyte_ledger::{GoldByteLedger, IssueRequest, LedgerConfig, ManualClock};
use goldbyte_types::{AccountId, Amount, BankCode, ReserveClass, WalletId, UNIT};

const ACCOUNTS: [&str; 4] = ["alice", "bob", "carol", "dave"];
const BANKS: [&str; 3] = ["LBG", "SBI", "HSBC"];

#[derive(Debug, Clone)]
enum Op {
    Issue {
        account: usize,
        amount: u128,
        issuer: usize,
        affiliation: Option<usize>,
        fiat: bool,
    },
    Transfer {
        from: usize,
        to: usize,
        amount: u128,
    },
    Redeem {
        account: usize,
        amount: u128,
        bank: usize,
    },
    AutoSettle {
        account: usize,
    },
    SetFeeExempt {
        account: usize,
        exempt: bool,
    },
    Advance {
        hours: i64,
    },
}

fn amount_strategy() -> impl Strategy<Value = u128> {
    prop_oneof![
        0u128..5_000,
        (0u128..1_000).prop_map(|whole| whole * UNIT),
        (1u128..1_000 * UNIT),
    ]
}

fn op_strategy() -> impl Strategy<Value = Vec<Op>> {
    let account = 0..ACCOUNTS.len();
    let bank = 0..BANKS.len();
    proptest::collection::vec(
        prop_oneof![
            3 => (account.clone(), amount_strategy(), bank.clone(), proptest::option::of(bank.clone()), any::<bool>())
                .prop_map(|(account, amount, issuer, affiliation, fiat)| Op::Issue {
                    account,
                    amount,
                    issuer,
                    affiliation,
                    fiat,
                }),
            2 => (account.clone(), account.clone(), amount_strategy())
                .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
            3 => (account.clone(), amount_strategy(), bank.clone())
                .prop_map(|(account, amount, bank)| Op::Redeem { account, amount, bank }),
            1 => account.clone().prop_map(|account| Op::AutoSettle { account }),
            1 => (account, any::<bool>())
                .prop_map(|(account, exempt)| Op::SetFeeExempt { account, exempt }),
            1 => (1i64..120).prop_map(|hours| Op::Advance { hours }),
        ],
        1..40,
    )
}

fn account(index: usize) -> AccountId {
    AccountId::new(ACCOUNTS[index])
}

fn bank(index: usize) -> BankCode {
    BankCode::parse(BANKS[index]).unwrap()
}

proptest! {
    #[test]
    fn property_backing_and_supply_hold_after_every_operation(ops in op_strategy()) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let admin = AccountId::new("imf");
        let ledger = GoldByteLedger::with_clock(&LedgerConfig::with_admin(admin.clone()), clock.clone());
        for (index, code) in BANKS.iter().enumerate() {
            ledger
                .register_bank(&admin, BankCode::parse(code).unwrap(), WalletId::new(format!("0x{:04}", index)))
                .unwrap();
        }

        for op in ops {
            let before = ledger.snapshot();
            let result = match op.clone() {
                Op::Issue { account: a, amount, issuer, affiliation, fiat } => {
                    let mut request = IssueRequest::new(account(a), Amount::from_units(amount), bank(issuer));
                    if let Some(affiliation) = affiliation {
                        request = request.affiliation(bank(affiliation));
                    }
                    if fiat {
                        request = request.reserve_class(ReserveClass::fiat());
                    }
                    ledger.issue_tokens(&admin, request).map(|_| ())
                }
                Op::Transfer { from, to, amount } => {
                    ledger.transfer(&account(from), &account(to), Amount::from_units(amount))
                }
                Op::Redeem { account: a, amount, bank: b } => {
                    ledger.redeem(&account(a), Amount::from_units(amount), &bank(b)).map(|_| ())
                }
                Op::AutoSettle { account: a } => ledger.auto_settle(&account(a)).map(|_| ()),
                Op::SetFeeExempt { account: a, exempt } => {
                    ledger.set_fee_exempt(&admin, &account(a), exempt)
                }
                Op::Advance { hours } => {
                    clock.advance(Duration::hours(hours));
                    Ok(())
                }
            };

            let after = ledger.snapshot();
            prop_assert!(after.check_invariants().is_ok(), "{:?} broke an invariant", op);

            if result.is_err() {
                prop_assert_eq!(after.journal().len(), before.journal().len());
                prop_assert_eq!(after.total_supply(), before.total_supply());
                prop_assert_eq!(after.accounts(), before.accounts());
                prop_assert_eq!(after.settlement_report(), before.settlement_report());
            }

            for issuer in BANKS.iter().map(|c| BankCode::parse(c).unwrap()) {
                for redeemer in BANKS.iter().map(|c| BankCode::parse(c).unwrap()) {
                    prop_assert_eq!(
                        after.net_settlements(&issuer, &redeemer).units(),
                        -after.net_settlements(&redeemer, &issuer).units()
                    );
                }
            }
        }
    }
}
