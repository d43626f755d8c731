//! Minibank CLI - Banking operations from command line
//!
//! Usage:
//! ```bash
//! minibank customer create --name "Alice" --address "1 Main St" --contact "alice@example.com"
//! minibank account open C0001 --kind saving --interest-rate 0.12 --initial-deposit 1000
//! minibank account open C0001 --kind current --overdraw-limit 100
//! minibank deposit A000001 250.00
//! minibank withdraw A000001 100.00
//! minibank balance A000001
//! minibank history A000001
//! minibank interest
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use minibank_business::BankService;
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;

/// Minibank - a small bank ledger on plain JSON files
#[derive(Parser)]
#[command(name = "minibank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory for the record files
    #[arg(long, default_value = "data", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Customer management
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Deposit funds into an account
    Deposit {
        /// Account number (e.g., A000001)
        account: String,
        /// Amount to deposit
        amount: Decimal,
    },

    /// Withdraw funds from an account
    Withdraw {
        /// Account number
        account: String,
        /// Amount to withdraw
        amount: Decimal,
    },

    /// Show the current balance of an account
    Balance {
        /// Account number
        account: String,
    },

    /// List the transaction history of an account
    History {
        /// Account number
        account: String,
    },

    /// Apply monthly interest to all saving accounts
    Interest,

    /// Show ledger status
    Status,
}

#[derive(Subcommand)]
pub enum CustomerAction {
    /// Create a new customer
    Create {
        #[arg(long, short)]
        name: String,
        #[arg(long, short)]
        address: String,
        #[arg(long, short)]
        contact: String,
    },
    /// List all customers
    List,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Open a new account for an existing customer
    Open {
        /// Owning customer ID (e.g., C0001)
        customer_id: String,
        /// Account kind
        #[arg(long, short)]
        kind: AccountKindArg,
        /// Annual interest rate for saving accounts (0.02 = 2%; default 0.02)
        #[arg(long)]
        interest_rate: Option<Decimal>,
        /// Overdraw limit for current accounts (default 0)
        #[arg(long)]
        overdraw_limit: Option<Decimal>,
        /// Opening deposit, logged as a regular deposit transaction
        #[arg(long, default_value = "0")]
        initial_deposit: Decimal,
    },
    /// List all accounts
    List,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AccountKindArg {
    Saving,
    Current,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // A corrupt record aborts here with a non-zero exit; the tool never
    // runs on partially-loaded state.
    let mut bank = BankService::open(&cli.data_dir)
        .with_context(|| format!("Failed to load ledger from {:?}", cli.data_dir))?;

    match cli.command {
        Commands::Customer { action } => match action {
            CustomerAction::Create {
                name,
                address,
                contact,
            } => commands::customer_create(&mut bank, &name, &address, &contact)?,
            CustomerAction::List => commands::customer_list(&bank),
        },

        Commands::Account { action } => match action {
            AccountAction::Open {
                customer_id,
                kind,
                interest_rate,
                overdraw_limit,
                initial_deposit,
            } => commands::account_open(
                &mut bank,
                &customer_id,
                kind,
                interest_rate,
                overdraw_limit,
                initial_deposit,
            )?,
            AccountAction::List => commands::account_list(&bank),
        },

        Commands::Deposit { account, amount } => {
            commands::deposit(&mut bank, &account, amount)?;
        }

        Commands::Withdraw { account, amount } => {
            commands::withdraw(&mut bank, &account, amount)?;
        }

        Commands::Balance { account } => {
            commands::balance(&bank, &account)?;
        }

        Commands::History { account } => {
            commands::history(&bank, &account)?;
        }

        Commands::Interest => {
            commands::interest(&mut bank)?;
        }

        Commands::Status => {
            commands::status(&bank);
        }
    }

    Ok(())
}
