//! # Customer Module
//!
//! A customer owns a set of accounts by reference: only account numbers
//! are stored here, resolved through the ledger store's indexes. Balance
//! mutation never goes through the customer.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bank customer with identity and contact data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID (C0001, C0002, ...)
    pub id: String,
    pub name: String,
    pub address: String,
    pub contact: String,
    /// Attached account numbers, in attachment order
    pub account_numbers: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer with no accounts
    pub fn new(id: String, name: String, address: String, contact: String) -> Self {
        Self {
            id,
            name,
            address,
            contact,
            account_numbers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach an existing account to this customer.
    ///
    /// Fails with `DuplicateAccount` if the number is already attached.
    pub fn add_account(&mut self, number: &str) -> CoreResult<()> {
        if self.account_numbers.iter().any(|n| n == number) {
            return Err(CoreError::DuplicateAccount(number.to_string()));
        }
        self.account_numbers.push(number.to_string());
        Ok(())
    }

    /// Attached account numbers in attachment order
    pub fn accounts(&self) -> &[String] {
        &self.account_numbers
    }

    /// Generate a new customer ID
    pub fn generate_id(counter: u64) -> String {
        format!("C{:04}", counter)
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, accounts: {})",
            self.id,
            self.name,
            self.account_numbers.len()
        )
    }
}
