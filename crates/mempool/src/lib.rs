//! EmberBFT transaction mempool.
//!
//! The in-memory staging area between transaction ingress (gossip / RPC) and
//! block production (consensus). The pool admits, deduplicates, filters, and
//! orders opaque transaction bytes so that consensus can repeatedly reap a
//! bounded batch of still-valid transactions, and so that peers can stream
//! the pool contents without blocking producers.
//!
//! # Architecture
//!
//! - `transaction`: the opaque [`Tx`] bytes and the pooled entry metadata
//! - `clist`: concurrent linked list with blocking cursors (the pool store)
//! - `cache`: bounded FIFO set of recently seen transactions
//! - `filter`: the pluggable admission validator seam
//! - `wal`: optional append-only log of admitted transactions
//! - `config`: pool configuration
//! - `error`: error types for mempool operations
//! - `mempool`: the coordinator tying the pieces together
//!
//! # Data flow
//!
//! Ingress calls [`Mempool::add_tx`]: seen-cache check, limit check, filter
//! chain, WAL append, pool append. Consensus drives egress with
//! `lock → reap → (commit) → update`, holding the guard from
//! [`Mempool::lock`] across the whole cycle. Broadcast readers stream the
//! pool head via [`Mempool::front_wait`] without taking the coordinator lock.

pub mod cache;
pub mod clist;
pub mod config;
pub mod error;
pub mod filter;
pub mod mempool;
pub mod transaction;
pub mod wal;

pub use cache::TxCache;
pub use clist::{CList, Element};
pub use config::MempoolConfig;
pub use error::MempoolError;
pub use filter::TxFilter;
pub use mempool::{Mempool, MempoolLock};
pub use transaction::{PooledTx, Tx};
pub use wal::Wal;
