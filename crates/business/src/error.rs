//! Business layer errors

use minibank_core::CoreError;
use minibank_persistence::PersistenceError;
use thiserror::Error;

/// Errors surfaced by bank service operations.
///
/// `Domain` errors are user-facing (bad amount, unknown account, ...)
/// and leave the system fully usable. `Persistence` errors abort the
/// current operation after its in-memory effect has been rolled back.
#[derive(Debug, Error)]
pub enum BusinessError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    /// User-facing validation failure, as opposed to a storage failure
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}
