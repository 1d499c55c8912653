//! The transaction pool: admission pipeline, replace-by-fee, eviction,
//! block reconciliation, and block-building ordering, per `spec.md` §4.E.

mod announce;
mod config;
mod error;
mod events;
mod lifecycle;
mod manager;
mod metrics;
pub mod pool;
mod state;
#[cfg(test)]
mod test_fixtures;
mod validate;

pub use announce::{KnownByPeer, PeerRequestSink};
pub use config::{
    PoolConfig, HANDLED_CLEANUP_TIME_LIMIT, MAX_DATA_BYTES, MAX_PER_SENDER,
    POOLED_STORAGE_TIME_LIMIT, POOL_MAX_SIZE, REPLACEMENT_BUMP_PERCENT, TX_RETRIEVAL_LIMIT,
};
pub use error::PoolError;
pub use events::{PoolEvent, PoolEventBroadcast};
pub use manager::TransactionPool;
pub use pool::{InsertOutcome, PooledTransaction, SubPool, TxPool};
pub use state::{Account, StateProvider, TestStateProvider};
pub use validate::{validate_transaction, ValidatedTransaction};
