//! Domain errors for Minibank, defined with thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Business-rule failures only; infrastructure errors live in the
/// persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    // === Amount errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    // === Account errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already attached to customer: {0}")]
    DuplicateAccount(String),

    #[error("Not a saving account: {0}")]
    NotASavingAccount(String),

    // === Customer errors ===
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Check whether this is an insufficient funds error
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, CoreError::InsufficientFunds { .. })
    }

    /// Check whether this is a not-found error (account or customer)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::AccountNotFound(_) | CoreError::CustomerNotFound(_)
        )
    }
}
