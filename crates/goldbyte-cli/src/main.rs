//! GoldByte CLI - Operator tool for the reserve-backed GB ledger
//!
//! The ledger lives in a JSON state file (default `goldbyte-state.json`,
//! override with `--state` or `GOLDBYTE_STATE`). Commands that act on behalf
//! of someone take the acting account from `--as` or `GOLDBYTE_CALLER`.
//!
//! # Quick Start
//!
//! ```bash
//! GOLDBYTE_ADMINS=imf goldbyte init
//! goldbyte --as imf bank register LBG 0xA341
//! goldbyte --as imf bank register SBI 0x8f48
//! goldbyte --as imf issue alice 100 --issuer LBG --affiliation SBI
//! goldbyte --as alice redeem 100 --bank SBI
//! goldbyte settlement
//! goldbyte clear
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use goldbyte_types::{AccountId, Amount, BankCode, ReserveClass, WalletId};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod display;
mod store;

use commands::{admin, reports, tokens};
use store::StateStore;

/// GoldByte CLI - reserve-backed consortium ledger
#[derive(Parser)]
#[command(name = "goldbyte")]
#[command(author = "GoldByte Contributors")]
#[command(version)]
#[command(about = "Issue, transfer, redeem and settle reserve-backed GB tokens", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Ledger state file
    #[arg(long, global = true, env = "GOLDBYTE_STATE", default_value = "goldbyte-state.json")]
    state: PathBuf,

    /// Account performing the operation
    #[arg(long = "as", global = true, env = "GOLDBYTE_CALLER")]
    caller: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ledger from GOLDBYTE_* configuration
    Init {
        /// Replace an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Manage consortium banks
    Bank {
        #[command(subcommand)]
        action: BankCommands,
    },

    /// Mint tokens against locked reserve
    Issue {
        /// Receiving account
        account: String,

        /// Amount in GB (e.g. 100 or 99.93)
        amount: Amount,

        /// Issuing bank
        #[arg(long)]
        issuer: BankCode,

        /// Bank the holder is affiliated with
        #[arg(long)]
        affiliation: Option<BankCode>,

        /// Backing reserve class (defaults to the configured class)
        #[arg(long)]
        reserve: Option<ReserveClass>,
    },

    /// Transfer tokens from the acting account
    Transfer {
        /// Receiving account
        to: String,

        /// Amount in GB
        amount: Amount,
    },

    /// Redeem the acting account's tokens through a bank
    Redeem {
        /// Amount in GB
        amount: Amount,

        /// Redeeming bank
        #[arg(long)]
        bank: BankCode,
    },

    /// Force-redeem an account held past the holding period
    AutoSettle {
        account: String,
    },

    /// Grant or revoke an account's redemption fee exemption
    FeeExempt {
        account: String,

        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },

    /// Show an account's balance and issuance details
    Balance {
        account: String,
    },

    /// Show reserve pools and total supply
    Reserves,

    /// Show interbank settlement positions
    Settlement {
        #[arg(long)]
        issuer: Option<BankCode>,

        #[arg(long)]
        redeemer: Option<BankCode>,
    },

    /// Net the open settlement positions into payment legs
    Clear {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or verify the event journal
    Journal {
        /// First sequence number to show
        #[arg(long, default_value = "0")]
        from: u64,

        /// Only verify the hash chain
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Subcommand)]
enum BankCommands {
    /// Register or replace a bank's settlement wallet
    Register {
        code: BankCode,
        wallet: String,
    },

    /// List registered banks
    List,
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    init_logging();

    let cli = Cli::parse();
    let store = StateStore::new(&cli.state);

    match cli.command {
        Commands::Init { force } => admin::init(&store, force)?,

        Commands::Bank { action } => match action {
            BankCommands::Register { code, wallet } => {
                let caller = caller(&cli.caller)?;
                admin::register_bank(&store, &caller, code, WalletId::new(wallet))?;
            }
            BankCommands::List => reports::banks(&store)?,
        },

        Commands::Issue {
            account,
            amount,
            issuer,
            affiliation,
            reserve,
        } => {
            let caller = caller(&cli.caller)?;
            tokens::issue(
                &store,
                &caller,
                AccountId::new(account),
                amount,
                issuer,
                affiliation,
                reserve,
            )?;
        }

        Commands::Transfer { to, amount } => {
            let caller = caller(&cli.caller)?;
            tokens::transfer(&store, &caller, &AccountId::new(to), amount)?;
        }

        Commands::Redeem { amount, bank } => {
            let caller = caller(&cli.caller)?;
            tokens::redeem(&store, &caller, amount, &bank)?;
        }

        Commands::AutoSettle { account } => {
            tokens::auto_settle(&store, &AccountId::new(account))?;
        }

        Commands::FeeExempt { account, revoke } => {
            let caller = caller(&cli.caller)?;
            admin::set_fee_exempt(&store, &caller, &AccountId::new(account), !revoke)?;
        }

        Commands::Balance { account } => reports::balance(&store, &AccountId::new(account))?,
        Commands::Reserves => reports::reserves(&store)?,
        Commands::Settlement { issuer, redeemer } => reports::settlement(&store, issuer, redeemer)?,
        Commands::Clear { json } => reports::clearing(&store, json)?,
        Commands::Journal { from, verify } => reports::journal(&store, from, verify)?,
    }

    Ok(())
}

/// Initialize tracing/logging on stderr, keeping stdout for command output
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goldbyte=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn caller(caller: &Option<String>) -> anyhow::Result<AccountId> {
    match caller.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(AccountId::new(id)),
        _ => anyhow::bail!("this command needs an acting account: pass --as <account> or set GOLDBYTE_CALLER"),
    }
}
