//! Administration commands - ledger setup, bank registry, fee exemptions

use anyhow::Context;
use colored::*;
use goldbyte_ledger::LedgerConfig;
use goldbyte_types::{AccountId, BankCode, WalletId};

use crate::display;
use crate::store::StateStore;

/// Create a new ledger file from the environment configuration
pub fn init(store: &StateStore, force: bool) -> anyhow::Result<()> {
    let config = LedgerConfig::from_env().context("Invalid ledger configuration")?;
    store.create(&config, force)?;

    display::section("GoldByte ledger created");
    display::kv("State file", &store.path().display().to_string());
    let classes: Vec<&str> = config.reserve_classes.iter().map(|c| c.as_str()).collect();
    display::kv("Reserve classes", &classes.join(", "));
    display::kv("Default class", config.default_reserve_class.as_str());

    if config.admins.is_empty() {
        display::warning("No administrators configured (set GOLDBYTE_ADMINS); banks cannot be registered");
    } else {
        let admins: Vec<&str> = config.admins.iter().map(|a| a.as_str()).collect();
        display::kv("Administrators", &admins.join(", "));
    }
    Ok(())
}

pub fn register_bank(
    store: &StateStore,
    caller: &AccountId,
    code: BankCode,
    wallet: WalletId,
) -> anyhow::Result<()> {
    store.update(|ledger| {
        ledger
            .register_bank(caller, code.clone(), wallet.clone())
            .with_context(|| format!("Failed to register bank {}", code))
    })?;

    display::success(&format!(
        "Bank {} settles to wallet {}",
        code.as_str().bright_cyan(),
        wallet.as_str().bright_yellow()
    ));
    Ok(())
}

pub fn set_fee_exempt(
    store: &StateStore,
    caller: &AccountId,
    account: &AccountId,
    exempt: bool,
) -> anyhow::Result<()> {
    store.update(|ledger| {
        ledger
            .set_fee_exempt(caller, account, exempt)
            .with_context(|| format!("Failed to change fee exemption of {}", account))
    })?;

    if exempt {
        display::success(&format!("{} is exempt from redemption fees", account));
    } else {
        display::success(&format!("{} pays redemption fees", account));
    }
    Ok(())
}
