//! The RLPx peer session state machine: ECIES handshake wiring, `HELLO`
//! capability negotiation, and the steady-state `Header`/`Body` framing
//! loop (snappy compression, keepalive), per `spec.md` §4.B.

mod error;
mod framing;
mod keepalive;
mod stream;

pub use error::P2PStreamError;
pub use framing::{body_wire_len, HEADER_WIRE_LEN};
pub use keepalive::{PING_INTERVAL, PING_TIMEOUT};
pub use stream::{IncomingMessage, P2PStream, UnauthedP2PStream, SNAPPY_PROTOCOL_VERSION};

pub use reth_eth_wire_types::*;
