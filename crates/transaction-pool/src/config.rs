//! Pool-tunable constants and their runtime configuration, per `spec.md` §6
//! ("Pool-tunable constants").

use std::time::Duration;

/// Hard cap on total pool size across all senders.
pub const POOL_MAX_SIZE: usize = 5000;

/// Hard cap on outstanding transactions for a single sender.
pub const MAX_PER_SENDER: usize = 100;

/// Max hashes requested in a single `GetPooledTransactions` per announcement
/// batch.
pub const TX_RETRIEVAL_LIMIT: usize = 256;

/// How long a pooled transaction may sit unmined before the cleanup sweep
/// evicts it.
pub const POOLED_STORAGE_TIME_LIMIT: Duration = Duration::from_secs(20 * 60);

/// How long a `handled` hash is remembered before the cleanup sweep forgets
/// it (after which a re-announcement of the same hash is processed again).
pub const HANDLED_CLEANUP_TIME_LIMIT: Duration = Duration::from_secs(60 * 60);

/// A replacement transaction at the same `(sender, nonce)` must beat the
/// incumbent's effective price by at least this percentage.
pub const REPLACEMENT_BUMP_PERCENT: u128 = 10;

/// Max `tx.data` length in bytes.
pub const MAX_DATA_BYTES: usize = 128 * 1024;

/// Runtime-configurable knobs layered on top of the fixed constants above.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Floor on `effectiveGasPrice(tx, baseFee)` for admission.
    pub min_gas_price: u128,
    /// Max entries in the whole pool.
    pub max_pool_size: usize,
    /// Max entries per sender.
    pub max_per_sender: usize,
    /// Max `tx.data` length accepted.
    pub max_data_bytes: usize,
    /// Replacement price bump, in percent.
    pub replacement_bump_percent: u128,
    /// How long an unmined transaction survives before cleanup evicts it.
    pub pooled_storage_time_limit: Duration,
    /// How long a `handled`/`knownByPeer` entry survives before cleanup
    /// forgets it.
    pub handled_cleanup_time_limit: Duration,
    /// Max hashes requested per announcement-driven retrieval batch.
    pub tx_retrieval_limit: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_gas_price: 1,
            max_pool_size: POOL_MAX_SIZE,
            max_per_sender: MAX_PER_SENDER,
            max_data_bytes: MAX_DATA_BYTES,
            replacement_bump_percent: REPLACEMENT_BUMP_PERCENT,
            pooled_storage_time_limit: POOLED_STORAGE_TIME_LIMIT,
            handled_cleanup_time_limit: HANDLED_CLEANUP_TIME_LIMIT,
            tx_retrieval_limit: TX_RETRIEVAL_LIMIT,
        }
    }
}
