//! # Minibank Core
//!
//! Core domain types for Minibank: accounts (saving/current variants),
//! customers, immutable transactions, and the domain error taxonomy.

pub mod account;
pub mod customer;
pub mod error;
pub mod transaction;

pub use account::{current_period, Account, AccountKind};
pub use customer::Customer;
pub use error::{CoreError, CoreResult};
pub use transaction::{Transaction, TransactionKind};
