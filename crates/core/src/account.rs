//! # Account Module
//!
//! Defines `Account` and its two variants (`Saving`, `Current`).
//! Both variants share the deposit/withdraw/balance contract; the variant
//! decides the balance floor and the extra policy fields.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account variant with its policy fields.
///
/// Serialized with an explicit `type` tag so the record files stay
/// human-inspectable (`"type": "saving"` / `"type": "current"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountKind {
    /// Interest-bearing account; balance may never go negative.
    Saving {
        /// Annual interest rate (0.12 = 12% per year)
        interest_rate: Decimal,
        /// Last period ("YYYY-MM") interest was applied, for idempotence
        last_interest_period: Option<String>,
    },
    /// Checking account with an overdraft allowance.
    Current {
        /// Maximum magnitude the balance may go negative
        overdraw_limit: Decimal,
    },
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Saving { .. } => "saving",
            AccountKind::Current { .. } => "current",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A balance-bearing account owned by exactly one customer.
///
/// The owner is referenced by ID only; cross-links are resolved through
/// the ledger store's indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account number (A000001, A000002, ...), immutable after creation
    pub number: String,
    /// ID of the owning customer
    pub customer_id: String,
    /// Current balance; invariant depends on the variant
    pub balance: Decimal,
    /// Variant and its policy fields
    #[serde(flatten)]
    pub kind: AccountKind,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new saving account with zero balance
    pub fn new_saving(number: String, customer_id: String, interest_rate: Decimal) -> Self {
        Self {
            number,
            customer_id,
            balance: Decimal::ZERO,
            kind: AccountKind::Saving {
                interest_rate,
                last_interest_period: None,
            },
            created_at: Utc::now(),
        }
    }

    /// Create a new current account with zero balance
    pub fn new_current(number: String, customer_id: String, overdraw_limit: Decimal) -> Self {
        Self {
            number,
            customer_id,
            balance: Decimal::ZERO,
            kind: AccountKind::Current { overdraw_limit },
            created_at: Utc::now(),
        }
    }

    /// Lowest balance this account may reach (0 for saving,
    /// `-overdraw_limit` for current)
    pub fn floor(&self) -> Decimal {
        match &self.kind {
            AccountKind::Saving { .. } => Decimal::ZERO,
            AccountKind::Current { overdraw_limit } => -overdraw_limit,
        }
    }

    /// Amount currently available for withdrawal
    pub fn available(&self) -> Decimal {
        self.balance - self.floor()
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.kind, AccountKind::Saving { .. })
    }

    /// Increase the balance by `amount`.
    ///
    /// Fails with `InvalidAmount` if `amount <= 0`; never fails otherwise.
    pub fn deposit(&mut self, amount: Decimal) -> CoreResult<()> {
        check_amount(amount)?;
        self.balance += amount;
        Ok(())
    }

    /// Decrease the balance by `amount`.
    ///
    /// Fails with `InvalidAmount` if `amount <= 0`, or `InsufficientFunds`
    /// if the result would drop below the variant floor. No state change
    /// on failure.
    pub fn withdraw(&mut self, amount: Decimal) -> CoreResult<()> {
        check_amount(amount)?;
        let available = self.available();
        if amount > available {
            return Err(CoreError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Apply one month of interest for `period` ("YYYY-MM").
    ///
    /// Interest is `balance * interest_rate / 12`, truncated to two decimal
    /// places. Idempotent per period: a second call for the same period is
    /// a no-op returning `Ok(None)`. Returns the credited amount when the
    /// balance changed.
    ///
    /// Fails with `NotASavingAccount` on a current account.
    pub fn accrue_monthly_interest(&mut self, period: &str) -> CoreResult<Option<Decimal>> {
        let AccountKind::Saving {
            interest_rate,
            last_interest_period,
        } = &mut self.kind
        else {
            return Err(CoreError::NotASavingAccount(self.number.clone()));
        };

        if last_interest_period.as_deref() == Some(period) {
            return Ok(None);
        }

        let interest = (self.balance * *interest_rate / Decimal::from(12))
            .round_dp_with_strategy(2, RoundingStrategy::ToZero);

        *last_interest_period = Some(period.to_string());

        if interest > Decimal::ZERO {
            self.balance += interest;
            Ok(Some(interest))
        } else {
            Ok(None)
        }
    }

    /// Generate a new account number
    pub fn generate_number(counter: u64) -> String {
        format!("A{:06}", counter)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, owner: {}, balance: {})",
            self.number, self.kind, self.customer_id, self.balance
        )
    }
}

/// Current accrual period ("YYYY-MM") in UTC
pub fn current_period() -> String {
    Utc::now().format("%Y-%m").to_string()
}

fn check_amount(amount: Decimal) -> CoreResult<()> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidAmount(format!(
            "Amount must be positive: {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn saving() -> Account {
        Account::new_saving("A000001".to_string(), "C0001".to_string(), dec!(0.12))
    }

    fn current(limit: Decimal) -> Account {
        Account::new_current("A000002".to_string(), "C0001".to_string(), limit)
    }

    #[test]
    fn test_deposit() {
        let mut account = saving();
        account.deposit(dec!(100.50)).unwrap();
        assert_eq!(account.balance, dec!(100.50));

        account.deposit(dec!(49.50)).unwrap();
        assert_eq!(account.balance, dec!(150));
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let mut account = saving();
        assert!(matches!(
            account.deposit(dec!(-5)),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            account.deposit(dec!(0)),
            Err(CoreError::InvalidAmount(_))
        ));
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_saving_withdraw_floor_is_zero() {
        let mut account = saving();
        account.deposit(dec!(100)).unwrap();

        account.withdraw(dec!(100)).unwrap();
        assert_eq!(account.balance, dec!(0));

        let err = account.withdraw(dec!(1)).unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_current_withdraw_into_overdraft() {
        // Overdraw limit 100, balance 0: withdrawing 100 succeeds,
        // one more unit fails and leaves the balance untouched.
        let mut account = current(dec!(100));

        account.withdraw(dec!(100)).unwrap();
        assert_eq!(account.balance, dec!(-100));

        let err = account.withdraw(dec!(1)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientFunds {
                requested: dec!(1),
                available: dec!(0),
            }
        );
        assert_eq!(account.balance, dec!(-100));
    }

    #[test]
    fn test_monthly_interest() {
        // 12% annual on 1000 credits 10.00 for one month
        let mut account = saving();
        account.deposit(dec!(1000)).unwrap();

        let credited = account.accrue_monthly_interest("2026-08").unwrap();
        assert_eq!(credited, Some(dec!(10.00)));
        assert_eq!(account.balance, dec!(1010.00));
    }

    #[test]
    fn test_monthly_interest_idempotent_per_period() {
        let mut account = saving();
        account.deposit(dec!(1000)).unwrap();

        assert!(account.accrue_monthly_interest("2026-08").unwrap().is_some());
        assert_eq!(account.accrue_monthly_interest("2026-08").unwrap(), None);
        assert_eq!(account.balance, dec!(1010.00));

        // A new period accrues again
        assert!(account.accrue_monthly_interest("2026-09").unwrap().is_some());
        assert_eq!(account.balance, dec!(1020.10));
    }

    #[test]
    fn test_interest_truncates_to_two_decimals() {
        // 1000.99 * 0.12 / 12 = 10.0099 -> truncated to 10.00 (ToZero)
        let mut account = saving();
        account.deposit(dec!(1000.99)).unwrap();

        let credited = account.accrue_monthly_interest("2026-08").unwrap();
        assert_eq!(credited, Some(dec!(10.00)));
        assert_eq!(account.balance, dec!(1010.99));
    }

    #[test]
    fn test_interest_on_zero_balance_is_noop() {
        let mut account = saving();
        assert_eq!(account.accrue_monthly_interest("2026-08").unwrap(), None);
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_interest_on_current_account_fails() {
        let mut account = current(dec!(100));
        let err = account.accrue_monthly_interest("2026-08").unwrap_err();
        assert!(matches!(err, CoreError::NotASavingAccount(_)));
    }

    #[test]
    fn test_account_number_generation() {
        assert_eq!(Account::generate_number(1), "A000001");
        assert_eq!(Account::generate_number(42), "A000042");
    }

    #[test]
    fn test_serde_type_tag() {
        let account = current(dec!(100));
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"type\":\"current\""));
        assert!(json.contains("\"overdraw_limit\":\"100\""));

        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
