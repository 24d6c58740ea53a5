//! Mempool configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default block size used to derive the pool's tx limit.
pub const DEFAULT_BLOCK_SIZE: usize = 5_000;

/// Default seen-cache capacity.
pub const DEFAULT_CACHE_SIZE: usize = 100_000;

/// Mempool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolConfig {
    /// Target block size in transactions; the pool admits up to twice this
    /// many when limits are enabled.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Whether to enforce the pool length limit at admission.
    #[serde(default)]
    pub enable_txs_limits: bool,

    /// Directory for the append-only transaction log. `None` disables the
    /// WAL.
    #[serde(default)]
    pub wal_dir: Option<PathBuf>,

    /// Capacity of the seen-cache.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            enable_txs_limits: false,
            wal_dir: None,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl MempoolConfig {
    /// Upper bound on pool length when limits are enabled.
    pub fn tx_limit(&self) -> usize {
        self.block_size * 2
    }
}
