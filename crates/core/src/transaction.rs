//! # Transaction Module
//!
//! Immutable, timestamped, sequentially-identified records of every
//! balance mutation. Constructed only by the persistence layer's
//! transaction log; never mutated or deleted afterward.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a transaction did to the balance. The amount is always positive;
/// its direction comes from the kind, never from a signed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    InterestCredit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::InterestCredit => "interest_credit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID (T00000001, ...), monotonically increasing,
    /// never reused even across restarts
    pub id: String,
    /// Creation time, set once
    pub timestamp: DateTime<Utc>,
    /// Account affected
    pub account_number: String,
    pub kind: TransactionKind,
    /// Positive amount; meaning determined by `kind`
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(id: String, account_number: String, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            account_number,
            kind,
            amount,
        }
    }

    /// Generate a new transaction ID
    pub fn generate_id(counter: u64) -> String {
        format!("T{:08}", counter)
    }

    /// Parse the numeric counter out of a transaction ID
    pub fn parse_counter(id: &str) -> Option<u64> {
        id.strip_prefix('T').and_then(|n| n.parse().ok())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.amount,
            self.id
        )
    }
}
