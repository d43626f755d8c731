//! Command handlers - thin dispatch over the bank service

use crate::AccountKindArg;
use anyhow::Result;
use minibank_business::{AccountSpec, BankService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Create a new customer
pub fn customer_create(
    bank: &mut BankService,
    name: &str,
    address: &str,
    contact: &str,
) -> Result<()> {
    let customer = bank.create_customer(name, address, contact)?;

    println!("✅ Customer created!");
    println!("   ID:      {}", customer.id);
    println!("   Name:    {}", customer.name);
    println!("   Contact: {}", customer.contact);
    Ok(())
}

/// List all customers
pub fn customer_list(bank: &BankService) {
    let store = bank.store();
    if store.customer_count() == 0 {
        println!("No customers.");
        return;
    }
    for customer in store.customers() {
        println!("{}", customer);
    }
}

/// Resolve the kind flag and its policy flags into an account spec.
///
/// A policy flag that does not apply to the chosen kind is rejected
/// rather than silently dropped.
pub fn resolve_spec(
    kind: AccountKindArg,
    interest_rate: Option<Decimal>,
    overdraw_limit: Option<Decimal>,
) -> Result<AccountSpec> {
    match kind {
        AccountKindArg::Saving => {
            if overdraw_limit.is_some() {
                anyhow::bail!("--overdraw-limit only applies to current accounts");
            }
            Ok(AccountSpec::Saving {
                interest_rate: interest_rate.unwrap_or(dec!(0.02)),
            })
        }
        AccountKindArg::Current => {
            if interest_rate.is_some() {
                anyhow::bail!("--interest-rate only applies to saving accounts");
            }
            Ok(AccountSpec::Current {
                overdraw_limit: overdraw_limit.unwrap_or(Decimal::ZERO),
            })
        }
    }
}

/// Open a new account for an existing customer
pub fn account_open(
    bank: &mut BankService,
    customer_id: &str,
    kind: AccountKindArg,
    interest_rate: Option<Decimal>,
    overdraw_limit: Option<Decimal>,
    initial_deposit: Decimal,
) -> Result<()> {
    let spec = resolve_spec(kind, interest_rate, overdraw_limit)?;
    let account = bank.open_account(customer_id, spec, initial_deposit)?;

    println!("✅ Account opened!");
    println!("   Number:  {}", account.number);
    println!("   Kind:    {}", account.kind);
    println!("   Owner:   {}", account.customer_id);
    println!("   Balance: {}", account.balance);
    Ok(())
}

/// List all accounts
pub fn account_list(bank: &BankService) {
    let store = bank.store();
    if store.account_count() == 0 {
        println!("No accounts.");
        return;
    }
    for account in store.accounts() {
        println!("{}", account);
    }
}

/// Deposit funds
pub fn deposit(bank: &mut BankService, account: &str, amount: Decimal) -> Result<()> {
    let tx = bank.deposit(account, amount)?;

    println!("✅ Deposit successful!");
    println!("   Transaction: {}", tx.id);
    println!("   Amount:      {}", tx.amount);
    println!("   Balance:     {}", bank.balance(account)?);
    Ok(())
}

/// Withdraw funds
pub fn withdraw(bank: &mut BankService, account: &str, amount: Decimal) -> Result<()> {
    let tx = bank.withdraw(account, amount)?;

    println!("✅ Withdrawal successful!");
    println!("   Transaction: {}", tx.id);
    println!("   Amount:      {}", tx.amount);
    println!("   Balance:     {}", bank.balance(account)?);
    Ok(())
}

/// Show the current balance
pub fn balance(bank: &BankService, account: &str) -> Result<()> {
    let balance = bank.balance(account)?;
    println!("Balance of {}: {}", account, balance);
    Ok(())
}

/// List the transaction history of an account
pub fn history(bank: &BankService, account: &str) -> Result<()> {
    let transactions = bank.history(account)?;
    if transactions.is_empty() {
        println!("No transactions for {}.", account);
        return Ok(());
    }

    println!("Transaction history for {}:", account);
    for tx in transactions {
        println!("  {}", tx);
    }
    Ok(())
}

/// Apply monthly interest to all saving accounts
pub fn interest(bank: &mut BankService) -> Result<()> {
    let credited = bank.apply_monthly_interest()?;
    if credited.is_empty() {
        println!("No interest due this period.");
        return Ok(());
    }

    println!("✅ Monthly interest applied!");
    for (number, amount) in credited {
        println!("   {} credited {}", number, amount);
    }
    Ok(())
}

/// Show ledger status
pub fn status(bank: &BankService) {
    let store = bank.store();
    println!("Ledger at {:?}", store.data_dir());
    println!("   Customers:    {}", store.customer_count());
    println!("   Accounts:     {}", store.account_count());
    println!("   Transactions: {}", store.transaction_count());
}
