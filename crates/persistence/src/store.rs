//! # Ledger Record Store
//!
//! Durable repository of customers, accounts, and transactions. Loads
//! everything at startup, rebuilds the in-memory indexes, and rewrites
//! the record files on mutation. Customers and accounts are loaded and
//! cross-linked before the transaction log is validated against them.
//!
//! File layout under the data directory:
//!
//! ```text
//! customers.json          pretty JSON array, whole-file rewrite
//! saving_accounts.json    pretty JSON array, whole-file rewrite
//! current_accounts.json   pretty JSON array, whole-file rewrite
//! transactions.jsonl      JSON Lines, append-only
//! ```

use crate::error::{file_name, PersistenceError, PersistenceResult};
use crate::log::TransactionLog;
use minibank_core::{Account, Customer, Transaction, TransactionKind};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CUSTOMERS_FILE: &str = "customers.json";
pub const SAVING_ACCOUNTS_FILE: &str = "saving_accounts.json";
pub const CURRENT_ACCOUNTS_FILE: &str = "current_accounts.json";
pub const TRANSACTIONS_FILE: &str = "transactions.jsonl";

/// In-memory indexes over the durable record files.
///
/// All mutation goes through the bank service; the store itself only
/// guarantees that a reported-successful write landed on disk.
#[derive(Debug)]
pub struct LedgerStore {
    data_dir: PathBuf,
    customers: BTreeMap<String, Customer>,
    accounts: BTreeMap<String, Account>,
    log: TransactionLog,
    next_customer_counter: u64,
    next_account_counter: u64,
}

impl LedgerStore {
    /// Open the store at `data_dir`, loading all four record collections.
    ///
    /// Fails with `CorruptRecord` if any record cannot be parsed or fails
    /// a cross-link check; the error names the offending file.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> PersistenceResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let customer_list: Vec<Customer> = read_collection(&data_dir.join(CUSTOMERS_FILE))?;
        let saving_list: Vec<Account> = read_collection(&data_dir.join(SAVING_ACCOUNTS_FILE))?;
        let current_list: Vec<Account> = read_collection(&data_dir.join(CURRENT_ACCOUNTS_FILE))?;

        for account in &saving_list {
            if !account.is_saving() {
                return Err(PersistenceError::corrupt(
                    SAVING_ACCOUNTS_FILE,
                    0,
                    format!("account {} is not a saving account", account.number),
                ));
            }
        }
        for account in &current_list {
            if account.is_saving() {
                return Err(PersistenceError::corrupt(
                    CURRENT_ACCOUNTS_FILE,
                    0,
                    format!("account {} is not a current account", account.number),
                ));
            }
        }

        let mut customers = BTreeMap::new();
        let mut next_customer_counter: u64 = 1;
        for customer in customer_list {
            next_customer_counter =
                next_customer_counter.max(parse_counter(&customer.id, 'C') + 1);
            if customers.insert(customer.id.clone(), customer).is_some() {
                return Err(PersistenceError::corrupt(
                    CUSTOMERS_FILE,
                    0,
                    "duplicate customer id",
                ));
            }
        }

        let mut accounts = BTreeMap::new();
        let mut next_account_counter: u64 = 1;
        for account in saving_list.into_iter().chain(current_list) {
            if !customers.contains_key(&account.customer_id) {
                return Err(PersistenceError::corrupt(
                    account_file(&account),
                    0,
                    format!(
                        "account {} references unknown customer {}",
                        account.number, account.customer_id
                    ),
                ));
            }
            next_account_counter =
                next_account_counter.max(parse_counter(&account.number, 'A') + 1);
            let file = account_file(&account);
            if accounts.insert(account.number.clone(), account).is_some() {
                return Err(PersistenceError::corrupt(file, 0, "duplicate account number"));
            }
        }

        for customer in customers.values() {
            for number in customer.accounts() {
                match accounts.get(number) {
                    Some(account) if account.customer_id == customer.id => {}
                    Some(_) => {
                        return Err(PersistenceError::corrupt(
                            CUSTOMERS_FILE,
                            0,
                            format!("account {} is not owned by customer {}", number, customer.id),
                        ))
                    }
                    None => {
                        return Err(PersistenceError::corrupt(
                            CUSTOMERS_FILE,
                            0,
                            format!("customer {} references unknown account {}", customer.id, number),
                        ))
                    }
                }
            }
        }

        // Accounts and customers are linked; now the log can be checked
        // against them.
        let log = TransactionLog::open(data_dir.join(TRANSACTIONS_FILE))?;
        for (idx, tx) in log.transactions().iter().enumerate() {
            if !accounts.contains_key(&tx.account_number) {
                return Err(PersistenceError::corrupt(
                    TRANSACTIONS_FILE,
                    idx + 1,
                    format!(
                        "transaction {} references unknown account {}",
                        tx.id, tx.account_number
                    ),
                ));
            }
        }

        tracing::info!(
            customers = customers.len(),
            accounts = accounts.len(),
            transactions = log.len(),
            "Ledger loaded"
        );

        Ok(Self {
            data_dir,
            customers,
            accounts,
            log,
            next_customer_counter,
            next_account_counter,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // === Lookup ===

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn customer_mut(&mut self, id: &str) -> Option<&mut Customer> {
        self.customers.get_mut(id)
    }

    pub fn account(&self, number: &str) -> Option<&Account> {
        self.accounts.get(number)
    }

    pub fn account_mut(&mut self, number: &str) -> Option<&mut Account> {
        self.accounts.get_mut(number)
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Numbers of all saving accounts, for the interest run
    pub fn saving_account_numbers(&self) -> Vec<String> {
        self.accounts
            .values()
            .filter(|a| a.is_saving())
            .map(|a| a.number.clone())
            .collect()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.log.len()
    }

    // === ID allocation ===

    /// Allocate the next customer ID (C0001, C0002, ...)
    pub fn next_customer_id(&mut self) -> String {
        let id = Customer::generate_id(self.next_customer_counter);
        self.next_customer_counter += 1;
        id
    }

    /// Allocate the next account number (A000001, A000002, ...)
    pub fn next_account_number(&mut self) -> String {
        let number = Account::generate_number(self.next_account_counter);
        self.next_account_counter += 1;
        number
    }

    // === Mutation ===

    /// Insert a new customer and rewrite the customer file.
    ///
    /// Rolls the insertion back if the write fails.
    pub fn insert_customer(&mut self, customer: Customer) -> PersistenceResult<()> {
        let id = customer.id.clone();
        self.customers.insert(id.clone(), customer);
        if let Err(e) = self.save_customers() {
            self.customers.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    /// Insert a new account and rewrite the account files.
    ///
    /// Rolls the insertion back if the write fails.
    pub fn insert_account(&mut self, account: Account) -> PersistenceResult<()> {
        let number = account.number.clone();
        self.accounts.insert(number.clone(), account);
        if let Err(e) = self.save_accounts() {
            self.accounts.remove(&number);
            return Err(e);
        }
        Ok(())
    }

    /// Remove an account record and rewrite the account files.
    ///
    /// Only used to roll back a partially-created account whose later
    /// writes failed.
    pub fn remove_account(&mut self, number: &str) -> PersistenceResult<Option<Account>> {
        let removed = self.accounts.remove(number);
        if removed.is_some() {
            self.save_accounts()?;
        }
        Ok(removed)
    }

    /// Rewrite the customer file from the in-memory index
    pub fn save_customers(&self) -> PersistenceResult<()> {
        write_collection(
            &self.data_dir.join(CUSTOMERS_FILE),
            &self.customers.values().collect::<Vec<_>>(),
        )
    }

    /// Rewrite both account files from the in-memory index
    pub fn save_accounts(&self) -> PersistenceResult<()> {
        let (saving, current): (Vec<&Account>, Vec<&Account>) =
            self.accounts.values().partition(|a| a.is_saving());
        write_collection(&self.data_dir.join(SAVING_ACCOUNTS_FILE), &saving)?;
        write_collection(&self.data_dir.join(CURRENT_ACCOUNTS_FILE), &current)?;
        Ok(())
    }

    // === Transaction log ===

    /// Append a transaction record; the sole way records come into being
    pub fn record(
        &mut self,
        account_number: &str,
        kind: TransactionKind,
        amount: Decimal,
    ) -> PersistenceResult<Transaction> {
        self.log.record(account_number, kind, amount)
    }

    /// Remove the most recently appended record (rollback only)
    pub fn truncate_last_transaction(&mut self) -> PersistenceResult<Option<Transaction>> {
        self.log.truncate_last()
    }

    /// All transactions in recorded order
    pub fn transactions(&self) -> &[Transaction] {
        self.log.transactions()
    }

    /// Transactions for one account, in recorded order
    pub fn transactions_for(&self, account_number: &str) -> Vec<&Transaction> {
        self.log.for_account(account_number)
    }
}

fn account_file(account: &Account) -> &'static str {
    if account.is_saving() {
        SAVING_ACCOUNTS_FILE
    } else {
        CURRENT_ACCOUNTS_FILE
    }
}

/// Parse the numeric part of a prefixed ID; 0 for foreign formats so the
/// counter recovery just ignores them
fn parse_counter(id: &str, prefix: char) -> u64 {
    id.strip_prefix(prefix)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> PersistenceResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        PersistenceError::corrupt(&file_name(path), e.line(), e.to_string())
    })
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> PersistenceResult<()> {
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::AccountKind;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn store_with_customer(dir: &Path) -> LedgerStore {
        let mut store = LedgerStore::open(dir).unwrap();
        let id = store.next_customer_id();
        store
            .insert_customer(Customer::new(
                id,
                "Alice".to_string(),
                "1 Main St".to_string(),
                "alice@example.com".to_string(),
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_open_empty_dir() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::open(dir.path()).unwrap();
        assert_eq!(store.customer_count(), 0);
        assert_eq!(store.account_count(), 0);
        assert_eq!(store.transaction_count(), 0);
    }

    #[test]
    fn test_round_trip_full_state() {
        let dir = tempdir().unwrap();

        {
            let mut store = store_with_customer(dir.path());
            let number = store.next_account_number();
            let mut account =
                Account::new_saving(number.clone(), "C0001".to_string(), dec!(0.12));
            account.deposit(dec!(500)).unwrap();
            store.insert_account(account).unwrap();
            store
                .customer_mut("C0001")
                .unwrap()
                .add_account(&number)
                .unwrap();
            store.save_customers().unwrap();
            store
                .record(&number, TransactionKind::Deposit, dec!(500))
                .unwrap();

            let number = store.next_account_number();
            store
                .insert_account(Account::new_current(
                    number.clone(),
                    "C0001".to_string(),
                    dec!(100),
                ))
                .unwrap();
            store
                .customer_mut("C0001")
                .unwrap()
                .add_account(&number)
                .unwrap();
            store.save_customers().unwrap();
        }

        let reloaded = LedgerStore::open(dir.path()).unwrap();
        assert_eq!(reloaded.customer_count(), 1);
        assert_eq!(reloaded.account_count(), 2);
        assert_eq!(reloaded.transaction_count(), 1);

        let customer = reloaded.customer("C0001").unwrap();
        assert_eq!(customer.name, "Alice");
        assert_eq!(customer.accounts(), &["A000001", "A000002"]);

        let saving = reloaded.account("A000001").unwrap();
        assert_eq!(saving.balance, dec!(500));
        assert!(matches!(
            saving.kind,
            AccountKind::Saving { interest_rate, .. } if interest_rate == dec!(0.12)
        ));

        let current = reloaded.account("A000002").unwrap();
        assert_eq!(current.floor(), dec!(-100));

        let tx = &reloaded.transactions()[0];
        assert_eq!(tx.id, "T00000001");
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, dec!(500));
    }

    #[test]
    fn test_counters_recovered_from_max_ids() {
        let dir = tempdir().unwrap();

        {
            let mut store = store_with_customer(dir.path());
            let number = store.next_account_number();
            store
                .insert_account(Account::new_current(number, "C0001".to_string(), dec!(0)))
                .unwrap();
        }

        let mut reloaded = LedgerStore::open(dir.path()).unwrap();
        assert_eq!(reloaded.next_customer_id(), "C0002");
        assert_eq!(reloaded.next_account_number(), "A000002");
    }

    #[test]
    fn test_corrupt_customer_file_names_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CUSTOMERS_FILE), "[{\"id\": ]").unwrap();

        let err = LedgerStore::open(dir.path()).unwrap_err();
        match err {
            PersistenceError::CorruptRecord { file, .. } => {
                assert_eq!(file, CUSTOMERS_FILE)
            }
            other => panic!("expected CorruptRecord, got {other}"),
        }
    }

    #[test]
    fn test_account_with_unknown_owner_is_corrupt() {
        let dir = tempdir().unwrap();

        {
            let mut store = store_with_customer(dir.path());
            let number = store.next_account_number();
            store
                .insert_account(Account::new_saving(
                    number,
                    "C0001".to_string(),
                    dec!(0.02),
                ))
                .unwrap();
        }

        // Drop the customer file so the account's owner is unknown
        fs::write(dir.path().join(CUSTOMERS_FILE), "[]").unwrap();

        let err = LedgerStore::open(dir.path()).unwrap_err();
        assert!(err.is_corrupt_record());
    }

    #[test]
    fn test_transaction_for_unknown_account_is_corrupt() {
        let dir = tempdir().unwrap();

        {
            let mut store = LedgerStore::open(dir.path()).unwrap();
            // Log entry with no matching account
            store
                .record("A999999", TransactionKind::Deposit, dec!(1))
                .unwrap();
        }

        let err = LedgerStore::open(dir.path()).unwrap_err();
        match err {
            PersistenceError::CorruptRecord { file, line, .. } => {
                assert_eq!(file, TRANSACTIONS_FILE);
                assert_eq!(line, 1);
            }
            other => panic!("expected CorruptRecord, got {other}"),
        }
    }

    #[test]
    fn test_wrong_variant_in_saving_file_is_corrupt() {
        let dir = tempdir().unwrap();

        {
            let _ = store_with_customer(dir.path());
        }

        // A current account hand-written into the saving file
        let account = Account::new_current("A000001".to_string(), "C0001".to_string(), dec!(50));
        fs::write(
            dir.path().join(SAVING_ACCOUNTS_FILE),
            serde_json::to_string_pretty(&[&account]).unwrap(),
        )
        .unwrap();

        let err = LedgerStore::open(dir.path()).unwrap_err();
        assert!(err.is_corrupt_record());
    }
}
