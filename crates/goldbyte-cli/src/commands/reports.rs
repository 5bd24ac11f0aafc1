//! Read-only commands - balances, reserves, settlement positions, clearing, journal

use anyhow::Context;
use colored::*;
use goldbyte_clearing::clear;
use goldbyte_ledger::{SettlementStatus, REDEMPTION_FEE_BPS};
use goldbyte_types::{AccountId, BankCode, TOKEN_NAME};

use crate::display;
use crate::store::StateStore;

pub fn balance(store: &StateStore, account: &AccountId) -> anyhow::Result<()> {
    let ledger = store.load()?;
    let state = ledger.snapshot();

    display::section(&format!("Account {}", account));
    display::kv("Balance", &display::gb(state.balance_of(account)));

    match state.issuance_info(account) {
        Some(record) => {
            display::kv("Issuer bank", record.issuer_bank.as_str());
            display::kv(
                "Affiliation",
                record.affiliation.as_ref().map(|b| b.as_str()).unwrap_or("-"),
            );
            display::kv("Reserve class", record.reserve_class.as_str());
            display::kv("Issued at", &record.issued_at.to_rfc3339());
        }
        None => display::info("No issuance record"),
    }

    let fee = if state.is_fee_exempt(account) {
        "exempt".to_string()
    } else {
        format!("{} bps", REDEMPTION_FEE_BPS)
    };
    display::kv("Redemption fee", &fee);

    let status = match state.settlement_status(account, ledger.now()) {
        SettlementStatus::Active { eligible_at } => {
            format!("active, auto-settles after {}", eligible_at.to_rfc3339())
        }
        SettlementStatus::Eligible => "eligible for auto-settlement".to_string(),
        SettlementStatus::Settled => "settled".to_string(),
    };
    display::kv("Status", &status);
    Ok(())
}

pub fn banks(store: &StateStore) -> anyhow::Result<()> {
    let ledger = store.load()?;
    let state = ledger.snapshot();

    display::section("Consortium banks");
    if state.bank_codes().is_empty() {
        display::info("No banks registered");
    }
    for code in state.bank_codes() {
        let wallet = state.lookup_bank(code)?;
        println!("  {} {:8} {}", "●".bright_cyan(), code.as_str().bright_white(), wallet.as_str().bright_yellow());
    }
    Ok(())
}

pub fn reserves(store: &StateStore) -> anyhow::Result<()> {
    let ledger = store.load()?;
    let state = ledger.snapshot();

    display::section(&format!("{} reserves", TOKEN_NAME));
    for (class, pool) in state.reserve_pools() {
        if &class == state.default_reserve_class() {
            println!("  {} {}", class.as_str().bright_white().bold(), "(default)".bright_black());
        } else {
            println!("  {}", class.as_str().bright_white().bold());
        }
        display::kv("Locked", &display::gb(pool.locked));
        display::kv("Retained fees", &display::gb(pool.retained_fees));
        display::kv("Released", &display::gb(pool.released));
    }
    display::kv("Total supply", &display::gb(state.total_supply()));
    Ok(())
}

/// Show one bilateral position, or every open position
pub fn settlement(
    store: &StateStore,
    issuer: Option<BankCode>,
    redeemer: Option<BankCode>,
) -> anyhow::Result<()> {
    let ledger = store.load()?;

    match (issuer, redeemer) {
        (Some(issuer), Some(redeemer)) => {
            let owed = ledger.net_settlements(&issuer, &redeemer);
            display::section(&format!("{} owes {}", issuer, redeemer));
            display::kv("Net", &display::position(owed));
        }
        (None, None) => {
            let report = ledger.settlement_report();
            display::section("Interbank settlement positions");
            if report.is_empty() {
                display::info("No open positions");
            }
            for entry in report.iter().filter(|e| e.amount.is_positive()) {
                println!(
                    "  {} {} owes {} {}",
                    "●".bright_cyan(),
                    entry.issuer.as_str().bright_white(),
                    entry.redeemer.as_str().bright_white(),
                    display::position(entry.amount)
                );
            }
        }
        _ => anyhow::bail!("pass both --issuer and --redeemer, or neither"),
    }
    Ok(())
}

pub fn clearing(store: &StateStore, json: bool) -> anyhow::Result<()> {
    let ledger = store.load()?;
    let plan = clear(&ledger.settlement_report()).context("Clearing failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    display::section("Clearing plan");
    display::kv("Gross obligations", &plan.gross_obligations.to_string());
    display::kv("Net payments", &plan.net_legs().to_string());
    display::kv("Efficiency", &format!("{:.1}%", plan.efficiency * 100.0));
    for leg in &plan.legs {
        println!(
            "  {} {} → {} {}",
            "●".bright_cyan(),
            leg.from.as_str().bright_white(),
            leg.to.as_str().bright_white(),
            display::gb(leg.amount).bright_cyan()
        );
    }
    display::kv("Positions hash", &plan.conservation_proof.positions_hash);
    if plan.conservation_proof.verified {
        display::success("Conservation verified");
    }
    Ok(())
}

pub fn journal(store: &StateStore, from: u64, verify: bool) -> anyhow::Result<()> {
    let ledger = store.load()?;

    if verify {
        if !ledger.verify_journal() {
            anyhow::bail!("Journal hash chain is broken");
        }
        display::success(&format!("Journal verified ({} records)", ledger.journal(0).len()));
        return Ok(());
    }

    let records = ledger.journal(from);
    display::section("Event journal");
    if records.is_empty() {
        display::info("No events");
    }
    for record in records {
        println!(
            "  {:>5} {} {}",
            record.sequence,
            record.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string().bright_black(),
            record.event.name().bright_white()
        );
        display::kv("hash", &record.hash[..16]);
        display::kv("event", &serde_json::to_string(&record.event)?);
    }
    Ok(())
}
