//! Transaction types for the mempool.

use bytes::Bytes;

/// Raw transaction bytes.
///
/// The mempool never parses a transaction; the byte sequence itself is its
/// identity. `Bytes` lets the pool entry and the seen-cache key share one
/// buffer.
pub type Tx = Bytes;

/// A transaction admitted to the pool, with its admission metadata.
#[derive(Clone, Debug)]
pub struct PooledTx {
    /// Admission sequence number; strictly increasing in insertion order.
    pub counter: i64,
    /// Last committed block height observed when this entry was admitted.
    pub height: i64,
    /// The transaction bytes.
    pub tx: Tx,
}
