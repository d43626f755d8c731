//! Bank service - the single entry point for every ledger operation
//!
//! Each mutating operation is one logical unit: validate, mutate the
//! in-memory model, record the transaction, persist, report. Any failure
//! rolls the in-memory effect back so memory and disk never diverge from
//! the caller's point of view.

use crate::error::BusinessResult;
use minibank_core::{
    current_period, Account, CoreError, Customer, Transaction, TransactionKind,
};
use minibank_persistence::LedgerStore;
use rust_decimal::Decimal;
use std::path::Path;

/// Variant-specific parameters for opening an account.
#[derive(Debug, Clone, Copy)]
pub enum AccountSpec {
    Saving { interest_rate: Decimal },
    Current { overdraw_limit: Decimal },
}

/// Orchestrates customers, accounts, and the transaction log on top of
/// a [`LedgerStore`].
pub struct BankService {
    store: LedgerStore,
}

impl BankService {
    /// Open the ledger at `data_dir`.
    ///
    /// A corrupt record aborts here; the service never runs on
    /// partially-loaded state.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> BusinessResult<Self> {
        let store = LedgerStore::open(data_dir)?;
        Ok(Self { store })
    }

    /// Read-only access to the underlying store
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Create a new customer and persist it.
    pub fn create_customer(
        &mut self,
        name: &str,
        address: &str,
        contact: &str,
    ) -> BusinessResult<Customer> {
        let id = self.store.next_customer_id();
        let customer = Customer::new(
            id.clone(),
            name.to_string(),
            address.to_string(),
            contact.to_string(),
        );
        self.store.insert_customer(customer.clone())?;
        tracing::info!(customer = %id, "Customer created");
        Ok(customer)
    }

    /// Open a new account for an existing customer.
    ///
    /// The account starts at zero balance; a positive `initial_deposit`
    /// then runs through the normal deposit path so it shows up in the
    /// transaction log like any other deposit.
    pub fn open_account(
        &mut self,
        customer_id: &str,
        spec: AccountSpec,
        initial_deposit: Decimal,
    ) -> BusinessResult<Account> {
        match spec {
            AccountSpec::Saving { interest_rate } if interest_rate < Decimal::ZERO => {
                return Err(CoreError::InvalidAmount(format!(
                    "Interest rate must not be negative: {interest_rate}"
                ))
                .into());
            }
            AccountSpec::Current { overdraw_limit } if overdraw_limit < Decimal::ZERO => {
                return Err(CoreError::InvalidAmount(format!(
                    "Overdraw limit must not be negative: {overdraw_limit}"
                ))
                .into());
            }
            _ => {}
        }
        if initial_deposit < Decimal::ZERO {
            return Err(CoreError::InvalidAmount(format!(
                "Initial deposit must not be negative: {initial_deposit}"
            ))
            .into());
        }
        if self.store.customer(customer_id).is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        let number = self.store.next_account_number();
        let account = match spec {
            AccountSpec::Saving { interest_rate } => {
                Account::new_saving(number.clone(), customer_id.to_string(), interest_rate)
            }
            AccountSpec::Current { overdraw_limit } => {
                Account::new_current(number.clone(), customer_id.to_string(), overdraw_limit)
            }
        };
        self.store.insert_account(account)?;

        // Attach to the owner. The number is freshly allocated, so
        // DuplicateAccount cannot occur on this path.
        if let Some(customer) = self.store.customer_mut(customer_id) {
            customer.add_account(&number)?;
        }
        if let Err(e) = self.store.save_customers() {
            self.detach_account(customer_id, &number);
            return Err(e.into());
        }

        if initial_deposit > Decimal::ZERO {
            if let Err(e) = self.deposit(&number, initial_deposit) {
                self.detach_account(customer_id, &number);
                if let Err(save_err) = self.store.save_customers() {
                    tracing::error!(
                        error = %save_err,
                        "Failed to rewrite customers after rolled-back account"
                    );
                }
                return Err(e);
            }
        }

        tracing::info!(account = %number, customer = %customer_id, "Account opened");
        self.store
            .account(&number)
            .cloned()
            .ok_or_else(|| CoreError::AccountNotFound(number).into())
    }

    /// Deposit `amount` into an account, recording one Deposit transaction.
    pub fn deposit(&mut self, number: &str, amount: Decimal) -> BusinessResult<Transaction> {
        let account = self
            .store
            .account_mut(number)
            .ok_or_else(|| CoreError::AccountNotFound(number.to_string()))?;
        let snapshot = account.clone();
        account.deposit(amount)?;
        self.commit(snapshot, TransactionKind::Deposit, amount)
    }

    /// Withdraw `amount` from an account, recording one Withdrawal
    /// transaction. Fails with `InsufficientFunds` if the balance would
    /// drop below the variant floor.
    pub fn withdraw(&mut self, number: &str, amount: Decimal) -> BusinessResult<Transaction> {
        let account = self
            .store
            .account_mut(number)
            .ok_or_else(|| CoreError::AccountNotFound(number.to_string()))?;
        let snapshot = account.clone();
        account.withdraw(amount)?;
        self.commit(snapshot, TransactionKind::Withdrawal, amount)
    }

    /// Current balance of an account. Pure read.
    pub fn balance(&self, number: &str) -> BusinessResult<Decimal> {
        self.store
            .account(number)
            .map(|a| a.balance)
            .ok_or_else(|| CoreError::AccountNotFound(number.to_string()).into())
    }

    /// All transactions affecting an account, in recorded order.
    pub fn history(&self, number: &str) -> BusinessResult<Vec<&Transaction>> {
        if self.store.account(number).is_none() {
            return Err(CoreError::AccountNotFound(number.to_string()).into());
        }
        Ok(self.store.transactions_for(number))
    }

    /// Apply monthly interest to every saving account for the current
    /// calendar month, recording one InterestCredit per credited account.
    /// Idempotent per period.
    pub fn apply_monthly_interest(&mut self) -> BusinessResult<Vec<(String, Decimal)>> {
        let period = current_period();
        self.apply_interest_for(&period)
    }

    /// Interest run for an explicit period ("YYYY-MM").
    pub fn apply_interest_for(&mut self, period: &str) -> BusinessResult<Vec<(String, Decimal)>> {
        let mut credited = Vec::new();
        // Marker-only stamps not yet covered by a commit's file rewrite
        let mut pending_markers: Vec<Account> = Vec::new();

        for number in self.store.saving_account_numbers() {
            let Some(account) = self.store.account_mut(&number) else {
                continue;
            };
            let snapshot = account.clone();
            let accrued = match account.accrue_monthly_interest(period) {
                Ok(accrued) => accrued,
                Err(e) => {
                    self.restore_all(pending_markers);
                    return Err(e.into());
                }
            };
            match accrued {
                Some(amount) => {
                    if let Err(e) = self.commit(snapshot, TransactionKind::InterestCredit, amount)
                    {
                        self.restore_all(pending_markers);
                        return Err(e);
                    }
                    // The commit rewrote the account files, so all
                    // stamps so far are on disk.
                    pending_markers.clear();
                    credited.push((number, amount));
                }
                None => {
                    // The period marker may still have been stamped
                    // (zero balance): persist it without a transaction.
                    if self.store.account(&number) != Some(&snapshot) {
                        pending_markers.push(snapshot);
                    }
                }
            }
        }

        if !pending_markers.is_empty() {
            if let Err(e) = self.store.save_accounts() {
                self.restore_all(pending_markers);
                return Err(e.into());
            }
        }
        if !credited.is_empty() {
            tracing::info!(period, accounts = credited.len(), "Interest applied");
        }
        Ok(credited)
    }

    /// Record the transaction and rewrite the account files; on failure
    /// restore the snapshot and drop the log entry, so a failed operation
    /// has no effect at all.
    fn commit(
        &mut self,
        snapshot: Account,
        kind: TransactionKind,
        amount: Decimal,
    ) -> BusinessResult<Transaction> {
        let number = snapshot.number.clone();

        let tx = match self.store.record(&number, kind, amount) {
            Ok(tx) => tx,
            Err(e) => {
                self.restore(snapshot);
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.save_accounts() {
            self.restore(snapshot);
            if let Err(rollback_err) = self.store.truncate_last_transaction() {
                tracing::error!(error = %rollback_err, "Failed to drop rolled-back transaction");
            }
            return Err(e.into());
        }

        tracing::info!(account = %number, kind = %kind, %amount, tx = %tx.id, "Operation committed");
        Ok(tx)
    }

    fn restore(&mut self, snapshot: Account) {
        if let Some(account) = self.store.account_mut(&snapshot.number) {
            *account = snapshot;
        }
    }

    fn restore_all(&mut self, snapshots: Vec<Account>) {
        for snapshot in snapshots {
            self.restore(snapshot);
        }
    }

    /// Undo a partially-opened account: detach from the owner and remove
    /// the record. Best-effort; failures are logged, not propagated.
    fn detach_account(&mut self, customer_id: &str, number: &str) {
        if let Some(customer) = self.store.customer_mut(customer_id) {
            customer.account_numbers.retain(|n| n != number);
        }
        if let Err(e) = self.store.remove_account(number) {
            tracing::error!(account = %number, error = %e, "Failed to remove rolled-back account");
        }
    }
}
