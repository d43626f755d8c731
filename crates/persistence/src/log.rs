//! JSONL transaction log - append-only writer
//!
//! The single place where transaction records are created. IDs are
//! sequential and recovered from the highest ID on disk at load time,
//! so they are never reused across restarts.

use crate::error::{file_name, PersistenceError, PersistenceResult};
use minibank_core::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only transaction log backed by a JSON Lines file.
///
/// Records are loaded fully at open, kept in memory in file order, and
/// appended one line at a time on `record`.
#[derive(Debug)]
pub struct TransactionLog {
    path: PathBuf,
    transactions: Vec<Transaction>,
    next_id: u64,
    writer: Option<BufWriter<File>>,
}

impl TransactionLog {
    /// Open the log at `path`, loading all existing records.
    ///
    /// Fails with `CorruptRecord` (naming the offending line) if any line
    /// cannot be parsed; never skips a record silently.
    pub fn open<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut transactions = Vec::new();
        let mut max_counter: u64 = 0;

        if path.exists() {
            let file_name = file_name(&path);
            let content = fs::read_to_string(&path)?;
            for (idx, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let tx: Transaction = serde_json::from_str(line).map_err(|e| {
                    PersistenceError::corrupt(&file_name, idx + 1, e.to_string())
                })?;
                match Transaction::parse_counter(&tx.id) {
                    Some(counter) => max_counter = max_counter.max(counter),
                    None => {
                        return Err(PersistenceError::corrupt(
                            &file_name,
                            idx + 1,
                            format!("invalid transaction id: {}", tx.id),
                        ))
                    }
                }
                transactions.push(tx);
            }
        }

        Ok(Self {
            path,
            transactions,
            next_id: max_counter + 1,
            writer: None,
        })
    }

    /// Record a balance mutation as a new immutable transaction.
    ///
    /// Assigns the next sequential ID, stamps the current time, appends
    /// one JSON line, and flushes before returning. A failed append
    /// leaves the log unchanged.
    pub fn record(
        &mut self,
        account_number: &str,
        kind: TransactionKind,
        amount: Decimal,
    ) -> PersistenceResult<Transaction> {
        let tx = Transaction::new(
            Transaction::generate_id(self.next_id),
            account_number.to_string(),
            kind,
            amount,
        );
        let json = serde_json::to_string(&tx)?;

        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }
        if let Some(ref mut writer) = self.writer {
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        tracing::debug!(id = %tx.id, kind = %kind, %amount, "Transaction recorded");

        self.next_id += 1;
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    /// All records in file order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Records affecting one account, in recorded order
    pub fn for_account(&self, account_number: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.account_number == account_number)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Remove the most recently appended record and rewrite the file
    /// without it. Used only to roll back a record whose enclosing
    /// operation failed a later write; the ID is not reused.
    pub fn truncate_last(&mut self) -> PersistenceResult<Option<Transaction>> {
        let Some(tx) = self.transactions.pop() else {
            return Ok(None);
        };

        self.writer = None;
        let mut lines = String::new();
        for t in &self.transactions {
            lines.push_str(&serde_json::to_string(t)?);
            lines.push('\n');
        }
        fs::write(&self.path, lines)?;

        tracing::warn!(id = %tx.id, "Transaction rolled back");
        Ok(Some(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_record_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");

        {
            let mut log = TransactionLog::open(&path).unwrap();
            let tx = log
                .record("A000001", TransactionKind::Deposit, dec!(100))
                .unwrap();
            assert_eq!(tx.id, "T00000001");
            log.record("A000001", TransactionKind::Withdrawal, dec!(30))
                .unwrap();
        }

        let log = TransactionLog::open(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.transactions()[0].id, "T00000001");
        assert_eq!(log.transactions()[1].kind, TransactionKind::Withdrawal);
    }

    #[test]
    fn test_id_recovered_after_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");

        {
            let mut log = TransactionLog::open(&path).unwrap();
            log.record("A000001", TransactionKind::Deposit, dec!(100))
                .unwrap();
            log.record("A000001", TransactionKind::Deposit, dec!(200))
                .unwrap();
        }

        // Second open continues from 3
        let mut log = TransactionLog::open(&path).unwrap();
        let tx = log
            .record("A000001", TransactionKind::Deposit, dec!(50))
            .unwrap();
        assert_eq!(tx.id, "T00000003");
    }

    #[test]
    fn test_corrupt_line_reported_with_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");

        let mut log = TransactionLog::open(&path).unwrap();
        log.record("A000001", TransactionKind::Deposit, dec!(100))
            .unwrap();
        drop(log);

        // Damage line 2
        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("{not json\n");
        fs::write(&path, content).unwrap();

        let err = TransactionLog::open(&path).unwrap_err();
        match err {
            PersistenceError::CorruptRecord { file, line, .. } => {
                assert_eq!(file, "transactions.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("expected CorruptRecord, got {other}"),
        }
    }

    #[test]
    fn test_for_account_filters_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");
        let mut log = TransactionLog::open(&path).unwrap();

        log.record("A000001", TransactionKind::Deposit, dec!(1)).unwrap();
        log.record("A000002", TransactionKind::Deposit, dec!(2)).unwrap();
        log.record("A000001", TransactionKind::Withdrawal, dec!(3)).unwrap();

        let hist = log.for_account("A000001");
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].id, "T00000001");
        assert_eq!(hist[1].id, "T00000003");
    }

    #[test]
    fn test_truncate_last_rewrites_file_and_keeps_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");
        let mut log = TransactionLog::open(&path).unwrap();

        log.record("A000001", TransactionKind::Deposit, dec!(100))
            .unwrap();
        log.record("A000001", TransactionKind::Deposit, dec!(200))
            .unwrap();

        let rolled_back = log.truncate_last().unwrap().unwrap();
        assert_eq!(rolled_back.id, "T00000002");
        assert_eq!(log.len(), 1);

        // The rolled-back ID is not reused
        let tx = log
            .record("A000001", TransactionKind::Deposit, dec!(300))
            .unwrap();
        assert_eq!(tx.id, "T00000003");

        // File matches memory
        let reloaded = TransactionLog::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.transactions()[1].id, "T00000003");
    }
}
