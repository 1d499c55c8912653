//! [`TransactionPool`]: the cloneable, async-friendly facade over
//! [`TxPool`] that the network's `TransactionsManager` and the block
//! builder talk to.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, B256};
use reth_eth_wire_types::PeerId;
use reth_primitives::TransactionSigned;
use tokio::sync::{broadcast, Mutex};

use crate::{
    announce::{handle_announced_tx_hashes, KnownByPeer, PeerRequestSink},
    config::PoolConfig,
    error::PoolError,
    events::{PoolEvent, PoolEventBroadcast},
    lifecycle::{Lifecycle, LifecycleHandle},
    metrics::PoolMetrics,
    pool::{InsertOutcome, TxPool},
    state::StateProvider,
};

/// The transaction pool: admission, ordering, announcement handling, and
/// lifecycle, behind a cloneable `Arc`-backed handle.
#[derive(Clone)]
pub struct TransactionPool {
    inner: Arc<Mutex<TxPool>>,
    known_by_peer: Arc<Mutex<KnownByPeer>>,
    provider: Arc<dyn StateProvider>,
    events: PoolEventBroadcast,
    lifecycle: LifecycleHandle,
    config: PoolConfig,
    metrics: Arc<PoolMetrics>,
}

impl TransactionPool {
    /// Creates a new pool backed by `provider`, governed by `config`.
    pub fn new(provider: Arc<dyn StateProvider>, config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TxPool::new(config))),
            known_by_peer: Arc::new(Mutex::new(KnownByPeer::default())),
            provider,
            events: PoolEventBroadcast::default(),
            lifecycle: Arc::new(Lifecycle::new()),
            config,
            metrics: Arc::new(PoolMetrics::default()),
        }
    }

    /// `open`: idempotent, returns `false` if already open.
    pub fn open(&self) -> bool {
        self.lifecycle.open()
    }

    /// `start`: arms the cleanup and re-announce sweep timers.
    pub fn start(&self) {
        let cleanup = {
            let pool = self.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(60));
                loop {
                    ticker.tick().await;
                    pool.sweep().await;
                }
            })
        };
        self.lifecycle.start(vec![cleanup]);
    }

    /// `stop`: disarms the timers. Subsequent sweeps must be triggered
    /// manually via [`Self::sweep`].
    pub fn stop(&self) {
        self.lifecycle.stop();
    }

    /// `close`: stops timers and clears all pool state.
    pub async fn close(&self) {
        self.lifecycle.close();
        self.inner.lock().await.clear();
    }

    /// Subscribes to the pool's event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    /// Runs the acceptance pipeline against `tx` and admits it on success.
    pub async fn add_transaction(&self, tx: TransactionSigned) -> Result<Address, PoolError> {
        if !self.lifecycle.is_accepting() {
            return Err(PoolError::PoolClosed);
        }
        let hash = *tx.hash();
        let result = self.inner.lock().await.insert(tx, self.provider.as_ref());
        match result {
            Ok(outcome) => {
                self.metrics.transactions_added.increment(1);
                match outcome {
                    InsertOutcome::Inserted { sender } => {
                        self.events.publish(PoolEvent::Added(hash));
                        Ok(sender)
                    }
                    InsertOutcome::Replaced { sender, old_hash } => {
                        self.events.publish(PoolEvent::Replaced { old: old_hash, new: hash });
                        Ok(sender)
                    }
                }
            }
            Err(err) => {
                self.metrics.transactions_rejected.increment(1);
                Err(err)
            }
        }
    }

    /// Handles `NewPooledTransactionHashes` received from `peer`, fetching
    /// and admitting unseen hashes and re-announcing newly admitted ones to
    /// `other_peers`.
    pub async fn handle_announced_tx_hashes(
        &self,
        sink: &dyn PeerRequestSink,
        peer: PeerId,
        other_peers: &[PeerId],
        hashes: Vec<B256>,
    ) {
        handle_announced_tx_hashes(
            &self.inner,
            &self.known_by_peer,
            &self.events,
            self.provider.as_ref(),
            sink,
            &self.config,
            peer,
            other_peers,
            hashes,
        )
        .await;
    }

    /// `removeNewBlockTxs`: drops a matching `(sender, nonce)` entry for
    /// each mined transaction.
    pub async fn remove_mined(&self, mined: &[(Address, u64)]) {
        let removed = self.inner.lock().await.remove_mined(mined, self.provider.as_ref());
        for hash in removed {
            self.metrics.transactions_mined.increment(1);
            self.events.publish(PoolEvent::Mined(hash));
        }
    }

    /// `getOrderedTransactions`: the deterministic block-building sequence.
    pub async fn ordered_transactions(
        &self,
        base_fee: Option<u64>,
    ) -> Vec<Arc<TransactionSigned>> {
        self.inner.lock().await.ordered_transactions(base_fee)
    }

    /// Current total pool size.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the pool is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Looks up a pooled transaction body by hash, for serving
    /// `GetPooledTransactions` requests.
    pub async fn get(&self, hash: &B256) -> Option<Arc<TransactionSigned>> {
        self.inner.lock().await.get(hash).map(|entry| entry.transaction.clone())
    }

    /// Runs the cleanup sweep once, outside of the `start`-armed timer.
    pub async fn sweep(&self) {
        let evicted = self.inner.lock().await.sweep_expired(
            self.config.pooled_storage_time_limit,
            self.config.handled_cleanup_time_limit,
            self.provider.as_ref(),
        );
        self.known_by_peer.lock().await.sweep_expired(self.config.handled_cleanup_time_limit);
        self.metrics.transactions_evicted.increment(evicted as u64);
    }
}
