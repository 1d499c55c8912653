//! Peer session management, `HELLO`/capability negotiation, the peer
//! pool, and transaction gossip, per `spec.md` §4.B/§4.F and this repo's
//! expanded `SPEC_FULL.md` §4.F.

mod metrics;
pub mod peers;
pub mod session;
pub mod transactions;

pub use metrics::{DisconnectMetrics, NetworkMetrics, TransactionsManagerMetrics};
pub use peers::{ConnectionInfo, Direction, Peer, PeerAction, PeerKind, PeersConfig, PeersHandle, PeersManager};
pub use session::{spawn, PeerCommand, PeerSessionHandle, SessionEvent};
pub use transactions::TransactionsManager;
