//! # Minibank Business
//!
//! Business logic layer - the bank service orchestrating validation,
//! balance mutation, transaction recording, and persistence.

pub mod bank;
pub mod error;

pub use bank::{AccountSpec, BankService};
pub use error::{BusinessError, BusinessResult};
