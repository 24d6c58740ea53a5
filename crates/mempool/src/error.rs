//! Error types for mempool operations.

use thiserror::Error;

/// Mempool errors. The admission-time variants are all recoverable by the
/// caller; `WalOpen` can only occur at construction.
#[derive(Debug, Error)]
pub enum MempoolError {
    /// The transaction was already observed recently.
    #[error("tx already exists in cache")]
    TxInCache,

    /// The pool holds more transactions than the configured limit.
    #[error("too many unsolved txs: {size} in pool (limit {limit})")]
    Full { size: usize, limit: usize },

    /// A registered filter rejected the transaction.
    #[error("plugin checktx failed: {0}")]
    FilterRejected(anyhow::Error),

    /// The configured WAL directory or file could not be opened.
    #[error("failed to open mempool wal: {0}")]
    WalOpen(#[from] std::io::Error),
}
