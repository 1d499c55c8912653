use reth_eth_wire_types::{DisconnectReason, MessageError};

/// Errors the peer session state machine can hit. Every variant carries an
/// implied `DisconnectReason` the caller should send before tearing the
/// connection down, per `spec.md` §7's transport-fatal handling.
#[derive(Debug, thiserror::Error)]
pub enum P2PStreamError {
    /// The ECIES handshake failed.
    #[error("ECIES handshake error: {0}")]
    Ecies(#[from] reth_ecies::ECIESError),
    /// A message failed to decode.
    #[error("message decode error: {0}")]
    Message(#[from] MessageError),
    /// The underlying transport errored.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Capability negotiation produced an empty intersection.
    #[error("no shared capabilities")]
    UselessPeer,
    /// The remote's `HELLO` advertised a `p2p` version this crate can't
    /// speak.
    #[error("incompatible protocol version: {0}")]
    IncompatibleProtocolVersion(u8),
    /// A keepalive `PING` went unanswered within the timeout.
    #[error("ping timeout")]
    PingTimeout,
    /// Snappy (de)compression failed.
    #[error("snappy error: {0}")]
    Snappy(#[from] snap::Error),
    /// The remote cleanly disconnected with a reason.
    #[error("peer disconnected: {0:?}")]
    Disconnected(DisconnectReason),
}
