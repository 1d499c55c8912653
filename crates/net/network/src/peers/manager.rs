//! The peer pool: registry of known peers, connection slot accounting, and
//! reputation-driven backoff on disconnect, per `spec.md` §4.F.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use reth_eth_wire::DisconnectReason;
use reth_eth_wire_types::PeerId;
use thiserror::Error;

use super::{
    reputation::{ReputationChangeWeights, BACKOFF_DURATION, BANNED_REPUTATION, DEFAULT_REPUTATION},
    DEFAULT_MAX_COUNT_CONCURRENT_DIALS, DEFAULT_MAX_COUNT_PEERS_INBOUND,
    DEFAULT_MAX_COUNT_PEERS_OUTBOUND,
};

/// Why a peer is tracked: affects whether it is ever evicted or banned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerKind {
    /// An ordinary discovered or dialed peer; subject to eviction/banning.
    #[default]
    Basic,
    /// A peer configured at startup; never evicted, still subject to
    /// temporary backoff.
    Static,
    /// A fully trusted peer; never evicted or banned.
    Trusted,
}

/// Which side initiated a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// We dialed out.
    Outbound,
    /// The peer dialed us.
    Inbound,
}

/// A tracked peer and its current session/reputation state.
#[derive(Debug, Clone)]
pub struct Peer {
    /// The peer's devp2p identity.
    pub remote_id: PeerId,
    /// Last known reachable address.
    pub addr: SocketAddr,
    /// Static/trusted/basic classification.
    pub kind: PeerKind,
    /// Current reputation score; starts at [`DEFAULT_REPUTATION`].
    pub reputation: i32,
    /// Set once reputation drops below [`BANNED_REPUTATION`]; the peer is
    /// excluded from dialing/accepting until this instant passes.
    pub backed_off_until: Option<Instant>,
    /// Whether a session with this peer is currently open.
    pub is_connected: bool,
}

impl Peer {
    fn new(remote_id: PeerId, addr: SocketAddr, kind: PeerKind) -> Self {
        Self {
            remote_id,
            addr,
            kind,
            reputation: DEFAULT_REPUTATION,
            backed_off_until: None,
            is_connected: false,
        }
    }

    /// Whether this peer is currently excluded from dialing/accepting.
    pub fn is_backed_off(&self) -> bool {
        self.backed_off_until.is_some_and(|until| Instant::now() < until)
    }
}

/// Connection-slot configuration.
#[derive(Debug, Clone, Copy)]
pub struct PeersConfig {
    /// Max concurrently open outbound sessions.
    pub max_outbound: u32,
    /// Max concurrently open inbound sessions.
    pub max_inbound: u32,
    /// Max concurrently in-flight outbound dial attempts.
    pub max_concurrent_dials: usize,
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            max_outbound: DEFAULT_MAX_COUNT_PEERS_OUTBOUND,
            max_inbound: DEFAULT_MAX_COUNT_PEERS_INBOUND,
            max_concurrent_dials: DEFAULT_MAX_COUNT_CONCURRENT_DIALS,
        }
    }
}

/// Snapshot of how many connection slots are currently in use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionInfo {
    /// Currently open inbound sessions.
    pub num_inbound: u32,
    /// Currently open outbound sessions.
    pub num_outbound: u32,
}

/// Why [`PeersManager::open`] refused a new session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InboundConnectionError {
    /// All inbound/outbound slots (per [`PeersConfig`]) are in use.
    #[error("connection slots exceeded")]
    ExceedsCapacity,
    /// The peer is within its post-ban backoff window.
    #[error("peer is backed off")]
    PeerBackedOff,
}

/// What a connection-level actor should do in response to a peer pool
/// decision (e.g. the session manager dialing out).
#[derive(Debug, Clone)]
pub enum PeerAction {
    /// Dial `remote_id` at `addr`.
    Connect {
        /// The target identity.
        peer_id: PeerId,
        /// The address to dial.
        addr: SocketAddr,
    },
    /// Tear down the session with `peer_id`, sending `reason` if set.
    Disconnect {
        /// The peer to disconnect.
        peer_id: PeerId,
        /// The reason to send, if the session is still writable.
        reason: Option<DisconnectReason>,
    },
}

/// The peer registry: add/remove/get/peers/open/close, per `spec.md` §4.F.
#[derive(Debug)]
pub struct PeersManager {
    peers: HashMap<PeerId, Peer>,
    connection_info: ConnectionInfo,
    config: PeersConfig,
    weights: ReputationChangeWeights,
}

impl PeersManager {
    /// Creates an empty peer pool with `config`'s connection-slot limits.
    pub fn new(config: PeersConfig) -> Self {
        Self {
            peers: HashMap::new(),
            connection_info: ConnectionInfo::default(),
            config,
            weights: ReputationChangeWeights::default(),
        }
    }

    /// Registers a peer, or updates its address/kind if already known.
    pub fn add(&mut self, peer_id: PeerId, addr: SocketAddr, kind: PeerKind) {
        self.peers
            .entry(peer_id)
            .and_modify(|p| {
                p.addr = addr;
                p.kind = kind;
            })
            .or_insert_with(|| Peer::new(peer_id, addr, kind));
    }

    /// Forgets a peer entirely. Does not close an open session.
    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Peer> {
        self.peers.remove(peer_id)
    }

    /// Looks up a peer's current state.
    pub fn get(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    /// All tracked peers.
    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    /// Current connection-slot usage.
    pub const fn connection_info(&self) -> ConnectionInfo {
        self.connection_info
    }

    /// Marks a session with `peer_id` as open, enforcing the configured
    /// slot limits and backoff window.
    pub fn open(
        &mut self,
        peer_id: PeerId,
        addr: SocketAddr,
        direction: Direction,
    ) -> Result<(), InboundConnectionError> {
        self.add(peer_id, addr, PeerKind::Basic);
        let peer = self.peers.get_mut(&peer_id).expect("just inserted");
        if peer.is_backed_off() {
            return Err(InboundConnectionError::PeerBackedOff);
        }

        match direction {
            Direction::Outbound if self.connection_info.num_outbound >= self.config.max_outbound => {
                return Err(InboundConnectionError::ExceedsCapacity);
            }
            Direction::Inbound if self.connection_info.num_inbound >= self.config.max_inbound => {
                return Err(InboundConnectionError::ExceedsCapacity);
            }
            _ => {}
        }

        peer.is_connected = true;
        match direction {
            Direction::Outbound => self.connection_info.num_outbound += 1,
            Direction::Inbound => self.connection_info.num_inbound += 1,
        }
        Ok(())
    }

    /// Closes a session, applying the reputation penalty for `reason` (if
    /// any) and arming a backoff window if the peer's score drops below
    /// [`BANNED_REPUTATION`]. Static/trusted peers are penalized but never
    /// banned outright.
    pub fn close(&mut self, peer_id: &PeerId, reason: Option<DisconnectReason>, direction: Direction) {
        match direction {
            Direction::Outbound => {
                self.connection_info.num_outbound = self.connection_info.num_outbound.saturating_sub(1);
            }
            Direction::Inbound => {
                self.connection_info.num_inbound = self.connection_info.num_inbound.saturating_sub(1);
            }
        }

        let Some(peer) = self.peers.get_mut(peer_id) else { return };
        peer.is_connected = false;

        let Some(reason) = reason else { return };
        peer.reputation += self.weights.change_for(reason);

        if peer.kind != PeerKind::Trusted && peer.reputation <= BANNED_REPUTATION {
            peer.backed_off_until = Some(backoff_deadline());
        }
    }
}

fn backoff_deadline() -> Instant {
    Instant::now() + BACKOFF_DURATION
}

/// A cloneable, lock-guarded handle to a [`PeersManager`], for sharing
/// across the session manager and transaction gossip tasks.
#[derive(Debug, Clone)]
pub struct PeersHandle {
    inner: Arc<Mutex<PeersManager>>,
}

impl PeersHandle {
    /// Wraps `manager` for shared access.
    pub fn new(manager: PeersManager) -> Self {
        Self { inner: Arc::new(Mutex::new(manager)) }
    }

    /// See [`PeersManager::add`].
    pub fn add(&self, peer_id: PeerId, addr: SocketAddr, kind: PeerKind) {
        self.inner.lock().add(peer_id, addr, kind);
    }

    /// See [`PeersManager::remove`].
    pub fn remove(&self, peer_id: &PeerId) -> Option<Peer> {
        self.inner.lock().remove(peer_id)
    }

    /// See [`PeersManager::get`].
    pub fn get(&self, peer_id: &PeerId) -> Option<Peer> {
        self.inner.lock().get(peer_id).cloned()
    }

    /// See [`PeersManager::peers`].
    pub fn peers(&self) -> Vec<Peer> {
        self.inner.lock().peers().cloned().collect()
    }

    /// See [`PeersManager::open`].
    pub fn open(
        &self,
        peer_id: PeerId,
        addr: SocketAddr,
        direction: Direction,
    ) -> Result<(), InboundConnectionError> {
        self.inner.lock().open(peer_id, addr, direction)
    }

    /// See [`PeersManager::close`].
    pub fn close(&self, peer_id: &PeerId, reason: Option<DisconnectReason>, direction: Direction) {
        self.inner.lock().close(peer_id, reason, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:30303".parse().unwrap()
    }

    #[test]
    fn open_respects_outbound_capacity() {
        let mut manager = PeersManager::new(PeersConfig { max_outbound: 1, ..PeersConfig::default() });
        manager.open(PeerId::ZERO, addr(), Direction::Outbound).unwrap();
        let err = manager.open(PeerId::repeat_byte(1), addr(), Direction::Outbound).unwrap_err();
        assert_eq!(err, InboundConnectionError::ExceedsCapacity);
    }

    #[test]
    fn repeated_protocol_errors_eventually_back_a_peer_off() {
        let mut manager = PeersManager::new(PeersConfig::default());
        let id = PeerId::ZERO;
        for _ in 0..3 {
            manager.open(id, addr(), Direction::Inbound).unwrap();
            manager.close(&id, Some(DisconnectReason::ProtocolError), Direction::Inbound);
        }
        assert!(manager.get(&id).unwrap().is_backed_off());
        let err = manager.open(id, addr(), Direction::Inbound).unwrap_err();
        assert_eq!(err, InboundConnectionError::PeerBackedOff);
    }

    #[test]
    fn requested_disconnect_never_bans() {
        let mut manager = PeersManager::new(PeersConfig::default());
        let id = PeerId::ZERO;
        for _ in 0..10 {
            manager.open(id, addr(), Direction::Inbound).unwrap();
            manager.close(&id, Some(DisconnectReason::DisconnectRequested), Direction::Inbound);
        }
        assert!(!manager.get(&id).unwrap().is_backed_off());
    }
}
