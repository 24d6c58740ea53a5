//! EmberBFT Prometheus metrics infrastructure.
//!
//! This crate provides centralized metric definitions for EmberBFT components.
//! Metrics are organized by subsystem; each subsystem module exposes its
//! collectors as statics plus a `register_metrics` hook.
//!
//! Exposition (the HTTP `/metrics` endpoint) is owned by the node binary, not
//! by this crate.

pub mod mempool;

use once_cell::sync::Lazy;
use prometheus::Registry;

/// Global Prometheus registry for all EmberBFT metrics.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();

    mempool::register_metrics(&registry);

    registry
});

/// Initialize all metrics. Call once at startup.
pub fn init() {
    Lazy::force(&REGISTRY);
    tracing::info!("EmberBFT metrics initialized");
}
