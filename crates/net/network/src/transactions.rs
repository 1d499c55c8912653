//! `TransactionsManager`: gossip fan-out (`announce_transactions`,
//! `announce_pooled_hashes`) and the [`PeerRequestSink`] the pool uses to
//! fetch bodies and re-announce hashes, per `spec.md` §4.F.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy_primitives::B256;
use parking_lot::RwLock;
use reth_eth_wire::{
    DisconnectReason, EthMessage, GetPooledTransactions, NewPooledTransactionHashes, PeerId, RequestPair, Status,
    Transactions,
};
use reth_primitives::TransactionSigned;
use reth_transaction_pool::{PeerRequestSink, TransactionPool};
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::{metrics::TransactionsManagerMetrics, session::PeerSessionHandle};

/// How long to wait for a `PooledTransactions` response before giving up on
/// a `GetPooledTransactions` request.
const GET_POOLED_TRANSACTIONS_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks connected peer sessions and mediates transaction gossip between
/// them and the local [`TransactionPool`].
pub struct TransactionsManager {
    pool: TransactionPool,
    /// This node's own `Status`, compared against every peer's to enforce
    /// the handshake's network id/genesis agreement before any other `eth`
    /// message is trusted.
    local_status: Status,
    sessions: RwLock<HashMap<PeerId, PeerSessionHandle>>,
    pending_requests: RwLock<HashMap<(PeerId, u64), oneshot::Sender<Vec<TransactionSigned>>>>,
    next_request_id: AtomicU64,
    metrics: TransactionsManagerMetrics,
}

impl TransactionsManager {
    /// Creates a manager with no peers registered yet, checking incoming
    /// `Status` messages against `local_status`.
    pub fn new(pool: TransactionPool, local_status: Status) -> Arc<Self> {
        Arc::new(Self {
            pool,
            local_status,
            sessions: RwLock::new(HashMap::new()),
            pending_requests: RwLock::new(HashMap::new()),
            next_request_id: AtomicU64::new(0),
            metrics: TransactionsManagerMetrics::default(),
        })
    }

    /// Registers a freshly established session so it participates in
    /// gossip and can serve/receive requests.
    pub fn register_session(&self, peer_id: PeerId, handle: PeerSessionHandle) {
        self.sessions.write().insert(peer_id, handle);
    }

    /// Forgets a session, typically once its `Disconnected` event arrives.
    pub fn remove_session(&self, peer_id: &PeerId) {
        self.sessions.write().remove(peer_id);
        self.pending_requests.write().retain(|(p, _), _| p != peer_id);
    }

    /// All peer ids other than `excluded` currently registered.
    fn other_peers(&self, excluded: PeerId) -> Vec<PeerId> {
        self.sessions.read().keys().filter(|&&id| id != excluded).copied().collect()
    }

    /// Dispatches a decoded `eth` message from `peer_id`.
    pub async fn handle_message(self: &Arc<Self>, peer_id: PeerId, message: EthMessage) {
        match message {
            EthMessage::Transactions(Transactions(txs)) => {
                for tx in txs {
                    let hash = *tx.hash();
                    if self.pool.add_transaction(tx).await.is_err() {
                        self.metrics.reported_bad_transactions.increment(1);
                        continue;
                    }
                    trace!(target: "net::tx", %peer_id, %hash, "accepted gossiped transaction");
                }
            }
            EthMessage::NewPooledTransactionHashes(NewPooledTransactionHashes(hashes)) => {
                let other_peers = self.other_peers(peer_id);
                let sink: Arc<Self> = self.clone();
                self.pool.handle_announced_tx_hashes(sink.as_ref(), peer_id, &other_peers, hashes).await;
            }
            EthMessage::GetPooledTransactions(RequestPair { request_id, message: hashes }) => {
                self.serve_get_pooled_transactions(peer_id, request_id, hashes).await;
            }
            EthMessage::PooledTransactions(RequestPair { request_id, message: txs }) => {
                if let Some(sender) = self.pending_requests.write().remove(&(peer_id, request_id)) {
                    let _ = sender.send(txs);
                }
            }
            EthMessage::Status(status) => {
                if !status.is_compatible_with(&self.local_status) {
                    debug!(
                        target: "net::tx",
                        %peer_id,
                        peer_network_id = status.network_id,
                        peer_genesis = %status.genesis,
                        "disconnecting peer with incompatible STATUS"
                    );
                    if let Some(session) = self.sessions.read().get(&peer_id).cloned() {
                        session.disconnect(DisconnectReason::SubprotocolError).await;
                    }
                }
            }
        }
    }

    async fn serve_get_pooled_transactions(&self, peer_id: PeerId, request_id: u64, hashes: Vec<B256>) {
        let mut found = Vec::with_capacity(hashes.len());
        for hash in hashes {
            if let Some(tx) = self.pool.get(&hash).await {
                found.push((*tx).clone());
            }
        }

        let Some(session) = self.sessions.read().get(&peer_id).cloned() else { return };
        let response = EthMessage::PooledTransactions(RequestPair { request_id, message: found });
        if !session.send(response).await {
            self.metrics.egress_peer_channel_full.increment(1);
        }
    }

    /// Broadcasts full transaction bodies to every connected peer, for
    /// transactions submitted directly to this node.
    pub async fn announce_transactions(&self, txs: Vec<TransactionSigned>) {
        if txs.is_empty() {
            return;
        }
        let sessions: Vec<_> = self.sessions.read().values().cloned().collect();
        let message = EthMessage::Transactions(Transactions(txs));
        for session in sessions {
            if session.send(message.clone()).await {
                self.metrics.propagated_transactions.increment(1);
            } else {
                self.metrics.egress_peer_channel_full.increment(1);
            }
        }
    }

    /// Broadcasts hash-only announcements to every connected peer.
    pub async fn announce_pooled_hashes(&self, hashes: Vec<B256>) {
        if hashes.is_empty() {
            return;
        }
        let sessions: Vec<_> = self.sessions.read().values().cloned().collect();
        let message = EthMessage::NewPooledTransactionHashes(NewPooledTransactionHashes(hashes));
        for session in sessions {
            let _ = session.send(message.clone()).await;
        }
    }
}

impl PeerRequestSink for TransactionsManager {
    fn get_pooled_transactions(
        &self,
        peer: PeerId,
        hashes: Vec<B256>,
    ) -> Pin<Box<dyn Future<Output = Vec<TransactionSigned>> + Send + '_>> {
        Box::pin(async move {
            let Some(session) = self.sessions.read().get(&peer).cloned() else {
                return Vec::new();
            };

            let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
            let (tx, rx) = oneshot::channel();
            self.pending_requests.write().insert((peer, request_id), tx);
            self.metrics.inflight_transaction_requests.increment(1.0);

            let request = GetPooledTransactions { request_id, message: hashes };
            if !session.send(EthMessage::GetPooledTransactions(request)).await {
                self.pending_requests.write().remove(&(peer, request_id));
                self.metrics.inflight_transaction_requests.decrement(1.0);
                return Vec::new();
            }

            let result = tokio::time::timeout(GET_POOLED_TRANSACTIONS_TIMEOUT, rx).await;
            self.pending_requests.write().remove(&(peer, request_id));
            self.metrics.inflight_transaction_requests.decrement(1.0);
            result.ok().and_then(Result::ok).unwrap_or_default()
        })
    }

    fn announce(&self, peer: PeerId, hashes: Vec<B256>) {
        let Some(session) = self.sessions.read().get(&peer).cloned() else { return };
        let message = EthMessage::NewPooledTransactionHashes(NewPooledTransactionHashes(hashes));
        tokio::spawn(async move {
            let _ = session.send(message).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reth_eth_wire::ForkId;
    use reth_transaction_pool::{PoolConfig, StateProvider, TestStateProvider};

    fn sample_status(network_id: u64) -> Status {
        Status {
            version: 68,
            network_id,
            total_difficulty: Default::default(),
            blockhash: Default::default(),
            genesis: B256::repeat_byte(0x11),
            fork_id: ForkId::default(),
        }
    }

    fn manager() -> Arc<TransactionsManager> {
        let provider: Arc<dyn StateProvider> = Arc::new(TestStateProvider::new());
        let pool = TransactionPool::new(provider, PoolConfig::default());
        TransactionsManager::new(pool, sample_status(1))
    }

    #[tokio::test]
    async fn get_pooled_transactions_returns_empty_for_unknown_peer() {
        let manager = manager();
        let result = manager.get_pooled_transactions(PeerId::ZERO, vec![B256::repeat_byte(1)]).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn mismatched_status_disconnects_the_peer() {
        let manager = manager();
        let (handle, mut commands) = crate::session::test_support::handle_with_commands(PeerId::ZERO);
        manager.register_session(PeerId::ZERO, handle);

        let mut mismatched = sample_status(1);
        mismatched.genesis = B256::repeat_byte(0x22);
        manager.handle_message(PeerId::ZERO, EthMessage::Status(mismatched)).await;

        let command = commands.recv().await.expect("a disconnect should have been queued");
        assert!(matches!(command, PeerCommand::Disconnect(DisconnectReason::SubprotocolError)));
    }

    #[tokio::test]
    async fn compatible_status_does_not_disconnect() {
        let manager = manager();
        let (handle, mut commands) = crate::session::test_support::handle_with_commands(PeerId::ZERO);
        manager.register_session(PeerId::ZERO, handle);

        manager.handle_message(PeerId::ZERO, EthMessage::Status(sample_status(1))).await;

        assert!(commands.try_recv().is_err());
    }
}
