//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping IO and serde errors.

use std::path::Path;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be parsed or failed a load-time
    /// consistency check. Identifies the offending file and line;
    /// line 0 means the failure concerns the file as a whole.
    #[error("Corrupt record in {file} at line {line}: {reason}")]
    CorruptRecord {
        file: String,
        line: usize,
        reason: String,
    },
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Create a CorruptRecord error
    pub fn corrupt(file: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// Check whether this error means the stored data is unreadable
    /// (as opposed to a failed write)
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }
}

/// Bare file name for error messages; falls back to the full path when
/// there is no final component
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_record_display() {
        let err = PersistenceError::corrupt("transactions.jsonl", 3, "expected value");
        assert_eq!(
            err.to_string(),
            "Corrupt record in transactions.jsonl at line 3: expected value"
        );
        assert!(err.is_corrupt_record());
    }
}
