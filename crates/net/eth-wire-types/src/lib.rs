//! Wire protocol types shared by the RLPx peer session (`reth-eth-wire`)
//! and anything that speaks the `eth` sub-protocol: capabilities, the
//! reserved base-protocol messages, `DISCONNECT` reasons, and the
//! pool-facing `eth` messages, per `spec.md` §4.B/§4.C/§6.

mod capability;
mod disconnect;
mod error;
mod hello;
mod p2p;
mod status;
mod transactions;

pub use capability::{negotiate_capabilities, Capability, SharedCapability};
pub use disconnect::DisconnectReason;
pub use error::MessageError;
pub use hello::{HelloMessage, PeerId};
pub use p2p::P2PMessage;
pub use status::{ForkId, Status};
pub use transactions::{
    EthMessage, EthVersion, GetPooledTransactions, NewPooledTransactionHashes, PooledTransactions,
    RequestPair, Transactions,
};
