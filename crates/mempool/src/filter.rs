//! Pluggable admission validators.

use crate::transaction::Tx;

/// A validator consulted at admission and again during the post-commit
/// recheck sweep.
///
/// Filters are stateless from the pool's point of view; an implementation
/// that needs state manages its own interior mutability. Errors are opaque to
/// the pool, which only wraps and surfaces them.
pub trait TxFilter: Send + Sync {
    /// Check a transaction. `Ok(())` admits; any error rejects.
    fn check_tx(&self, tx: &Tx) -> anyhow::Result<()>;
}
