//! Token commands - issuance, transfer, redemption, auto-settlement

use anyhow::Context;
use colored::*;
use goldbyte_ledger::{IssueRequest, Redemption};
use goldbyte_types::{AccountId, Amount, BankCode, ReserveClass};

use crate::display;
use crate::store::StateStore;

pub fn issue(
    store: &StateStore,
    caller: &AccountId,
    account: AccountId,
    amount: Amount,
    issuer: BankCode,
    affiliation: Option<BankCode>,
    reserve_class: Option<ReserveClass>,
) -> anyhow::Result<()> {
    let mut request = IssueRequest::new(account.clone(), amount, issuer);
    if let Some(bank) = affiliation {
        request = request.affiliation(bank);
    }
    if let Some(class) = reserve_class {
        request = request.reserve_class(class);
    }

    let (record, balance) = store.update(|ledger| {
        let record = ledger
            .issue_tokens(caller, request)
            .with_context(|| format!("Failed to issue {} to {}", display::gb(amount), account))?;
        Ok((record, ledger.balance_of(&account)))
    })?;

    display::success(&format!(
        "Issued {} to {}",
        display::gb(amount).bright_cyan(),
        account
    ));
    display::kv("Issuer bank", record.issuer_bank.as_str());
    display::kv("Settles via", record.settlement_bank().as_str());
    display::kv("Reserve class", record.reserve_class.as_str());
    display::kv("Balance", &display::gb(balance));
    Ok(())
}

pub fn transfer(
    store: &StateStore,
    from: &AccountId,
    to: &AccountId,
    amount: Amount,
) -> anyhow::Result<()> {
    let (sender, recipient) = store.update(|ledger| {
        ledger
            .transfer(from, to, amount)
            .with_context(|| format!("Failed to transfer {} from {} to {}", display::gb(amount), from, to))?;
        Ok((ledger.balance_of(from), ledger.balance_of(to)))
    })?;

    display::success(&format!("Transferred {} from {} to {}", display::gb(amount).bright_cyan(), from, to));
    display::kv(from.as_str(), &display::gb(sender));
    display::kv(to.as_str(), &display::gb(recipient));
    Ok(())
}

pub fn redeem(
    store: &StateStore,
    caller: &AccountId,
    amount: Amount,
    bank: &BankCode,
) -> anyhow::Result<()> {
    let redemption = store.update(|ledger| {
        ledger
            .redeem(caller, amount, bank)
            .with_context(|| format!("Failed to redeem {} at {}", display::gb(amount), bank))
    })?;

    display::success(&format!("Redeemed {} at {}", display::gb(amount).bright_cyan(), bank));
    show_redemption(&redemption);
    Ok(())
}

pub fn auto_settle(store: &StateStore, account: &AccountId) -> anyhow::Result<()> {
    let settled = store.update(|ledger| {
        ledger
            .auto_settle(account)
            .with_context(|| format!("Failed to auto-settle {}", account))
    })?;

    match settled {
        Some(redemption) => {
            display::success(&format!("Auto-settled {}", account));
            show_redemption(&redemption);
        }
        None => display::info(&format!("{} has nothing to settle", account)),
    }
    Ok(())
}

fn show_redemption(redemption: &Redemption) {
    display::kv("Issuer bank", redemption.issuer_bank.as_str());
    display::kv("Redeeming bank", redemption.redeeming_bank.as_str());
    display::kv("Reserve class", redemption.reserve_class.as_str());
    display::kv("Fee", &display::gb(redemption.fee));
    display::kv("Released", &display::gb(redemption.net));
}
