//! Announcement handling and `knownByPeer` bookkeeping, per `spec.md` §4.E's
//! `handleAnnouncedTxHashes` and the peer-pool broadcast helpers of §4.F.

use std::{collections::HashMap, future::Future, pin::Pin, time::Instant};

use alloy_primitives::B256;
use reth_eth_wire_types::PeerId;
use reth_primitives::TransactionSigned;
use schnellru::{ByLength, LruMap};

use crate::{
    config::PoolConfig,
    events::{PoolEvent, PoolEventBroadcast},
    pool::{InsertOutcome, TxPool},
    state::StateProvider,
};

/// Caps how many hashes are remembered per peer before the LRU evicts the
/// oldest. Independent of `POOL_MAX_SIZE`: a peer can have announced (and
/// had recorded) more hashes than currently fit in the pool.
const KNOWN_BY_PEER_CAPACITY: u32 = 4096;

/// The network-facing side of a peer session: what `handleAnnouncedTxHashes`
/// needs to fetch bodies and re-announce hashes, without this crate knowing
/// about RLPx framing or sessions.
pub trait PeerRequestSink: Send + Sync {
    /// Sends `GetPooledTransactions(batch)` to `peer` and awaits the
    /// `PooledTransactions` response.
    fn get_pooled_transactions(
        &self,
        peer: PeerId,
        hashes: Vec<B256>,
    ) -> Pin<Box<dyn Future<Output = Vec<TransactionSigned>> + Send + '_>>;

    /// Sends `NewPooledTransactionHashes(hashes)` to `peer`.
    fn announce(&self, peer: PeerId, hashes: Vec<B256>);
}

/// Tracks, per peer, which transaction hashes that peer is already known to
/// have (either because it announced them to us, or because we announced
/// them to it) — used to suppress redundant re-announcement.
#[derive(Default)]
pub struct KnownByPeer {
    by_peer: HashMap<PeerId, LruMap<B256, Instant>>,
}

impl KnownByPeer {
    /// Whether `peer` is known to already have `hash`.
    pub fn contains(&mut self, peer: PeerId, hash: &B256) -> bool {
        self.by_peer.get_mut(&peer).is_some_and(|lru| lru.get(hash).is_some())
    }

    /// Records that `peer` now knows about `hash`.
    pub fn insert(&mut self, peer: PeerId, hash: B256) {
        self.by_peer
            .entry(peer)
            .or_insert_with(|| LruMap::new(ByLength::new(KNOWN_BY_PEER_CAPACITY)))
            .insert(hash, Instant::now());
    }

    /// Drops entries older than `max_age` across all peers.
    pub fn sweep_expired(&mut self, max_age: std::time::Duration) {
        let now = Instant::now();
        self.by_peer.retain(|_, lru| {
            lru.retain(|_, added_at| now.duration_since(*added_at) <= max_age);
            lru.len() > 0
        });
    }
}

/// Implements `handleAnnouncedTxHashes`: filters hashes already handled or
/// already known to `peer`, fetches the rest in one batch (capped at
/// `tx_retrieval_limit`), admits each returned transaction, and
/// re-announces newly admitted hashes to every other peer that doesn't
/// already know them.
pub async fn handle_announced_tx_hashes(
    pool: &tokio::sync::Mutex<TxPool>,
    known: &tokio::sync::Mutex<KnownByPeer>,
    events: &PoolEventBroadcast,
    provider: &dyn StateProvider,
    sink: &dyn PeerRequestSink,
    config: &PoolConfig,
    peer: PeerId,
    other_peers: &[PeerId],
    hashes: Vec<B256>,
) {
    let mut outstanding = Vec::with_capacity(hashes.len());
    {
        let pool = pool.lock().await;
        let mut known_guard = known.lock().await;
        for hash in hashes {
            if !pool.is_handled(&hash) && !known_guard.contains(peer, &hash) {
                outstanding.push(hash);
            }
            // Recorded regardless, to suppress echoing this hash back to
            // the peer that just told us about it.
            known_guard.insert(peer, hash);
        }
    }

    for batch in outstanding.chunks(config.tx_retrieval_limit) {
        let fetched = sink.get_pooled_transactions(peer, batch.to_vec()).await;
        for tx in fetched {
            let hash = *tx.hash();
            let admitted = {
                let mut pool = pool.lock().await;
                pool.insert(tx, provider)
            };
            match admitted {
                Ok(outcome) => {
                    match outcome {
                        InsertOutcome::Inserted { .. } => events.publish(PoolEvent::Added(hash)),
                        InsertOutcome::Replaced { old_hash, .. } => {
                            events.publish(PoolEvent::Replaced { old: old_hash, new: hash });
                        }
                    }
                    let mut known_guard = known.lock().await;
                    for &other in other_peers {
                        if other == peer || known_guard.contains(other, &hash) {
                            continue;
                        }
                        known_guard.insert(other, hash);
                        sink.announce(other, vec![hash]);
                    }
                }
                Err(_) => events.publish(PoolEvent::Discarded(hash)),
            }
        }
    }
}
