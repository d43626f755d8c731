//! # Minibank Persistence
//!
//! Persistence layer for Minibank - JSON record files + JSONL
//! transaction log.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      LedgerStore                          │
//! │  ┌──────────────────┐        ┌─────────────────────────┐  │
//! │  │   JSON arrays    │        │     TransactionLog      │  │
//! │  │ customers,       │        │  transactions.jsonl     │  │
//! │  │ accounts (rewrite)│       │  (append-only)          │  │
//! │  └──────────────────┘        └─────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minibank_persistence::LedgerStore;
//!
//! let mut store = LedgerStore::open("data")?;
//! let tx = store.record("A000001", TransactionKind::Deposit, dec!(100))?;
//! store.save_accounts()?;
//! ```

pub mod error;
pub mod log;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use log::TransactionLog;
pub use store::LedgerStore;
