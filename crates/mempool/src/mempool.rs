//! The mempool coordinator.
//!
//! Owns the pool, the seen-cache, the filter chain, the optional WAL, and
//! the height/counter cursors. Admission (`add_tx`) runs lock-free with
//! respect to the coordinator mutex; the mutex serializes bulk mutation
//! (`flush`, the sweep in `update`) and backs the external lock contract
//! with consensus.

use crate::cache::TxCache;
use crate::clist::{CList, Element};
use crate::config::MempoolConfig;
use crate::error::MempoolError;
use crate::filter::TxFilter;
use crate::transaction::{PooledTx, Tx};
use crate::wal::Wal;
use emberbft_metrics::mempool as metrics;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Transaction mempool.
///
/// Concurrency: `counter` and `height` are atomics; the pool list and the
/// seen-cache carry their own synchronization; `mtx` is reserved for bulk
/// mutation and the consensus lock protocol. Broadcast readers iterating via
/// [`Mempool::front_wait`] never touch `mtx`.
pub struct Mempool {
    config: MempoolConfig,
    /// Concurrent list of good txs, in admission order.
    txs: CList<PooledTx>,
    /// Admission sequence number.
    counter: AtomicI64,
    /// The last block height passed to `update`.
    height: AtomicI64,
    /// Recently seen tx bodies, for duplicate rejection.
    cache: TxCache,
    /// Optional append-only log of admitted txs.
    wal: Option<Wal>,
    tx_limit: usize,
    filters: RwLock<Vec<Arc<dyn TxFilter>>>,
    mtx: ReentrantMutex<()>,
}

/// Guard returned by [`Mempool::lock`]; dropping it unlocks.
///
/// Consensus holds this across the commit cycle
/// `lock → reap → (commit) → update` so no concurrent `reap` observes a
/// partially updated pool and no block includes a tx that is about to be
/// pruned.
pub struct MempoolLock<'a> {
    _guard: ReentrantMutexGuard<'a, ()>,
}

impl Mempool {
    /// Create a mempool from config. Fails only when a configured WAL
    /// directory cannot be opened.
    pub fn new(config: MempoolConfig) -> Result<Self, MempoolError> {
        let wal = match &config.wal_dir {
            Some(dir) => Some(Wal::open(dir)?),
            None => None,
        };

        Ok(Self {
            txs: CList::new(),
            counter: AtomicI64::new(0),
            height: AtomicI64::new(0),
            cache: TxCache::new(config.cache_size),
            wal,
            tx_limit: config.tx_limit(),
            filters: RwLock::new(Vec::new()),
            mtx: ReentrantMutex::new(()),
            config,
        })
    }

    /// Register a filter at the end of the admission chain.
    pub fn register_filter(&self, filter: Arc<dyn TxFilter>) {
        self.filters.write().push(filter);
    }

    /// Acquire the coordinator lock for the commit cycle.
    ///
    /// `reap`, `update`, and `flush` re-acquire the lock internally; the
    /// mutex is reentrant, so they are safe to call while holding the
    /// returned guard on the same thread.
    pub fn lock(&self) -> MempoolLock<'_> {
        MempoolLock {
            _guard: self.mtx.lock(),
        }
    }

    /// Number of transactions in the pool. Lock-free.
    pub fn size(&self) -> usize {
        self.txs.len()
    }

    /// Try a new transaction in the mempool.
    ///
    /// The tx must pass the seen-cache, the pool limit (when enabled), and
    /// every registered filter. On success it is appended to the WAL (when
    /// configured) and becomes reapable.
    pub fn add_tx(&self, tx: Tx) -> Result<(), MempoolError> {
        metrics::MEMPOOL_TRANSACTIONS_RECEIVED.inc();

        if self.cache.exists(&tx) {
            metrics::MEMPOOL_TRANSACTIONS_REJECTED
                .with_label_values(&["duplicate"])
                .inc();
            return Err(MempoolError::TxInCache);
        }

        let size = self.txs.len();
        if self.config.enable_txs_limits && size > self.tx_limit {
            metrics::MEMPOOL_TRANSACTIONS_REJECTED
                .with_label_values(&["pool_full"])
                .inc();
            return Err(MempoolError::Full {
                size,
                limit: self.tx_limit,
            });
        }

        if let Err(err) = self.check_tx_with_filters(&tx) {
            metrics::MEMPOOL_TRANSACTIONS_REJECTED
                .with_label_values(&["filter"])
                .inc();
            return Err(MempoolError::FilterRejected(err));
        }

        if let Some(wal) = &self.wal {
            if let Err(err) = wal.append(&tx) {
                // The durability hook must not degrade silently.
                error!(%err, "mempool wal append failed, aborting");
                std::process::abort();
            }
        }

        // A concurrent admit of the same bytes may win the cache race; the
        // wal can then hold a spurious duplicate record.
        if !self.cache.push(tx.clone()) {
            metrics::MEMPOOL_TRANSACTIONS_REJECTED
                .with_label_values(&["duplicate"])
                .inc();
            return Err(MempoolError::TxInCache);
        }

        let counter = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let height = self.height.load(Ordering::SeqCst);
        self.txs.push_back(PooledTx {
            counter,
            height,
            tx: tx.clone(),
        });

        metrics::MEMPOOL_SIZE.set(self.txs.len() as f64);
        trace!(counter, height, tx = %short_hex(&tx), "admitted tx");
        Ok(())
    }

    /// Snapshot up to `max_txs` transactions from the head of the pool, in
    /// insertion order. `max_txs < 0` returns everything, `0` returns none.
    /// The pool is not mutated.
    pub fn reap(&self, max_txs: isize) -> Vec<Tx> {
        let _guard = self.mtx.lock();
        self.collect_txs(max_txs)
    }

    /// Tell the mempool these txs were committed at `height`. Committed txs
    /// are discarded; everything else is rerun through the filter chain and
    /// discarded on failure.
    ///
    /// Call this after the block is committed, holding the guard from
    /// [`Mempool::lock`] across the whole `reap → commit → update` cycle.
    pub fn update(&self, height: i64, committed: &[Tx]) {
        let committed_set: HashSet<Tx> = committed.iter().cloned().collect();

        // Visible to in-flight admits before the sweep takes the lock.
        self.height.store(height, Ordering::SeqCst);

        let _guard = self.mtx.lock();
        let (removed_committed, removed_recheck) = self.refresh_txs(&committed_set);
        metrics::MEMPOOL_SIZE.set(self.txs.len() as f64);
        debug!(
            height,
            committed = committed.len(),
            removed_committed,
            removed_recheck,
            size = self.txs.len(),
            "updated mempool"
        );
    }

    /// Remove all transactions from the pool and the seen-cache.
    pub fn flush(&self) {
        let _guard = self.mtx.lock();
        self.cache.reset();

        let mut removed = 0usize;
        let mut cursor = self.txs.front();
        while let Some(elem) = cursor {
            self.txs.remove(&elem);
            elem.detach_prev();
            removed += 1;
            cursor = elem.next();
        }

        metrics::MEMPOOL_TRANSACTIONS_REMOVED
            .with_label_values(&["flushed"])
            .inc_by(removed as f64);
        metrics::MEMPOOL_SIZE.set(0.0);
        debug!(removed, "flushed mempool");
    }

    /// Blocking cursor to the head of the pool, for broadcast readers.
    ///
    /// Suspends until the pool has an element; iterate with
    /// [`Element::next_wait`]. Readers may observe a tx that `update`
    /// removes before they reach it, so consumers deduplicate externally.
    pub fn front_wait(&self) -> Arc<Element<PooledTx>> {
        self.txs.front_wait()
    }

    fn collect_txs(&self, max_txs: isize) -> Vec<Tx> {
        let max = match max_txs {
            0 => return Vec::new(),
            n if n < 0 => self.txs.len(),
            n => (n as usize).min(self.txs.len()),
        };

        let mut txs = Vec::with_capacity(max);
        let mut cursor = self.txs.front();
        while let Some(elem) = cursor {
            if txs.len() >= max {
                break;
            }
            txs.push(elem.value().tx.clone());
            cursor = elem.next();
        }
        txs
    }

    /// The coherency sweep: drop committed txs and txs that no longer pass
    /// the filter chain. Visits at most the length observed at entry; txs
    /// admitted during the sweep already carry the new height.
    fn refresh_txs(&self, committed: &HashSet<Tx>) -> (usize, usize) {
        let mut removed_committed = 0usize;
        let mut removed_recheck = 0usize;

        let len = self.txs.len();
        let mut index = 0usize;
        let mut cursor = self.txs.front();
        while let Some(elem) = cursor {
            if index >= len {
                break;
            }
            index += 1;

            let pooled = elem.value();
            if committed.contains(&pooled.tx) {
                self.txs.remove(&elem);
                elem.detach_prev();
                self.cache.remove(&pooled.tx);
                metrics::MEMPOOL_TRANSACTIONS_REMOVED
                    .with_label_values(&["committed"])
                    .inc();
                removed_committed += 1;
            } else if let Err(err) = self.check_tx_with_filters(&pooled.tx) {
                trace!(tx = %short_hex(&pooled.tx), %err, "recheck failed, dropping tx");
                self.txs.remove(&elem);
                elem.detach_prev();
                self.cache.remove(&pooled.tx);
                metrics::MEMPOOL_TRANSACTIONS_REMOVED
                    .with_label_values(&["recheck_failed"])
                    .inc();
                removed_recheck += 1;
            }

            cursor = elem.next();
        }

        (removed_committed, removed_recheck)
    }

    /// Short-circuit evaluation of the filter chain, in registration order.
    /// An empty chain passes.
    fn check_tx_with_filters(&self, tx: &Tx) -> anyhow::Result<()> {
        let filters = self.filters.read();
        for filter in filters.iter() {
            filter.check_tx(tx)?;
        }
        Ok(())
    }
}

fn short_hex(tx: &[u8]) -> String {
    hex::encode(&tx[..tx.len().min(8)])
}
