use metrics::{Counter, Gauge};
use metrics_derive::Metrics;
use reth_eth_wire::DisconnectReason;

/// Metrics for the entire network, aggregated across peer sessions.
#[derive(Metrics)]
#[metrics(scope = "network")]
pub struct NetworkMetrics {
    /// Number of currently connected peers
    pub(crate) connected_peers: Gauge,

    /// Number of currently backed-off peers
    pub(crate) backed_off_peers: Gauge,

    /// Number of peers known to the node
    pub(crate) tracked_peers: Gauge,

    /// Cumulative number of failures of pending sessions
    pub(crate) pending_session_failures: Counter,

    /// Total number of sessions closed
    pub(crate) closed_sessions: Counter,

    /// Number of active incoming connections
    pub(crate) incoming_connections: Gauge,

    /// Number of active outgoing connections
    pub(crate) outgoing_connections: Gauge,

    /// Total number of incoming connections handled
    pub(crate) total_incoming_connections: Counter,

    /// Total number of outgoing connections established
    pub(crate) total_outgoing_connections: Counter,

    /// Number of invalid/malformed messages received from peers
    pub(crate) invalid_messages_received: Counter,
}

/// Metrics for [`crate::transactions::TransactionsManager`].
#[derive(Metrics)]
#[metrics(scope = "network")]
pub struct TransactionsManagerMetrics {
    /// Total number of propagated transactions
    pub(crate) propagated_transactions: Counter,
    /// Total number of reported bad transactions
    pub(crate) reported_bad_transactions: Counter,
    /// Total number of messages with already-seen hashes
    pub(crate) messages_with_already_seen_hashes: Counter,
    /// Total number of messages with already-seen full transactions
    pub(crate) messages_with_already_seen_transactions: Counter,
    /// Currently active outgoing `GetPooledTransactions` requests
    pub(crate) inflight_transaction_requests: Gauge,
    /// How often a request to a peer couldn't be sent because its channel was full
    pub(crate) egress_peer_channel_full: Counter,
}

/// Per-reason disconnect counters. Ideally these would be scoped per peer, so a peer dropped
/// twice for `TooManyPeers` (once outbound, once inbound) isn't double-counted, but that level of
/// granularity isn't worth the bookkeeping here.
#[derive(Metrics)]
#[metrics(scope = "network")]
pub struct DisconnectMetrics {
    /// `DISCONNECT_REQUESTED` (0x00)
    pub(crate) disconnect_requested: Counter,
    /// `NETWORK_ERROR` (0x01)
    pub(crate) network_error: Counter,
    /// `PROTOCOL_ERROR` (0x02)
    pub(crate) protocol_error: Counter,
    /// `USELESS_PEER` (0x03)
    pub(crate) useless_peer: Counter,
    /// `TOO_MANY_PEERS` (0x04)
    pub(crate) too_many_peers: Counter,
    /// `ALREADY_CONNECTED` (0x05)
    pub(crate) already_connected: Counter,
    /// `INCOMPATIBLE_VERSION` (0x06)
    pub(crate) incompatible_version: Counter,
    /// `INVALID_IDENTITY` (0x07)
    pub(crate) invalid_identity: Counter,
    /// `CLIENT_QUITTING` (0x08)
    pub(crate) client_quitting: Counter,
    /// `UNEXPECTED_IDENTITY` (0x09)
    pub(crate) unexpected_identity: Counter,
    /// `SAME_IDENTITY` (0x0a)
    pub(crate) same_identity: Counter,
    /// `TIMEOUT` (0x0b)
    pub(crate) timeout: Counter,
    /// `SUBPROTOCOL_ERROR` (0x10)
    pub(crate) subprotocol_error: Counter,
}

impl DisconnectMetrics {
    /// Increments the counter matching `reason`.
    pub(crate) fn increment(&self, reason: DisconnectReason) {
        match reason {
            DisconnectReason::DisconnectRequested => self.disconnect_requested.increment(1),
            DisconnectReason::NetworkError => self.network_error.increment(1),
            DisconnectReason::ProtocolError => self.protocol_error.increment(1),
            DisconnectReason::UselessPeer => self.useless_peer.increment(1),
            DisconnectReason::TooManyPeers => self.too_many_peers.increment(1),
            DisconnectReason::AlreadyConnected => self.already_connected.increment(1),
            DisconnectReason::IncompatibleVersion => self.incompatible_version.increment(1),
            DisconnectReason::InvalidIdentity => self.invalid_identity.increment(1),
            DisconnectReason::ClientQuitting => self.client_quitting.increment(1),
            DisconnectReason::UnexpectedIdentity => self.unexpected_identity.increment(1),
            DisconnectReason::SameIdentity => self.same_identity.increment(1),
            DisconnectReason::Timeout => self.timeout.increment(1),
            DisconnectReason::SubprotocolError => self.subprotocol_error.increment(1),
        }
    }
}
