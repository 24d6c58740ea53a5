//! Mempool metrics.

use once_cell::sync::Lazy;
use prometheus::{Counter, CounterVec, Gauge, Registry};

// Pool size
pub static MEMPOOL_SIZE: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new("emberbft_mempool_size", "Transactions currently in the pool")
        .expect("metric can be created")
});

// Throughput
pub static MEMPOOL_TRANSACTIONS_RECEIVED: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "emberbft_mempool_transactions_received_total",
        "Total transactions offered to the pool",
    )
    .expect("metric can be created")
});

pub static MEMPOOL_TRANSACTIONS_REJECTED: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        prometheus::opts!(
            "emberbft_mempool_transactions_rejected_total",
            "Total transactions rejected at admission"
        ),
        &["reason"], // "duplicate", "pool_full", "filter"
    )
    .expect("metric can be created")
});

pub static MEMPOOL_TRANSACTIONS_REMOVED: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        prometheus::opts!(
            "emberbft_mempool_transactions_removed_total",
            "Total transactions removed from the pool"
        ),
        &["reason"], // "committed", "recheck_failed", "flushed"
    )
    .expect("metric can be created")
});

// WAL
pub static MEMPOOL_WAL_BYTES_WRITTEN: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "emberbft_mempool_wal_bytes_written_total",
        "Total bytes appended to the mempool WAL",
    )
    .expect("metric can be created")
});

/// Register all mempool metrics with the given registry.
pub fn register_metrics(registry: &Registry) {
    registry.register(Box::new(MEMPOOL_SIZE.clone())).ok();
    registry
        .register(Box::new(MEMPOOL_TRANSACTIONS_RECEIVED.clone()))
        .ok();
    registry
        .register(Box::new(MEMPOOL_TRANSACTIONS_REJECTED.clone()))
        .ok();
    registry
        .register(Box::new(MEMPOOL_TRANSACTIONS_REMOVED.clone()))
        .ok();
    registry
        .register(Box::new(MEMPOOL_WAL_BYTES_WRITTEN.clone()))
        .ok();
}
