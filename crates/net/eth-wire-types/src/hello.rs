//! The `HELLO` handshake message, sent immediately after the ECIES
//! handshake completes, per `spec.md` §4.B.

use alloy_primitives::B512;
use alloy_rlp::{RlpDecodable, RlpEncodable};

use crate::capability::Capability;

/// A node's devp2p identity, the uncompressed public key minus its leading
/// `0x04` byte.
pub type PeerId = B512;

/// `[protocolVersion, clientId, capabilities, listenPort, nodeId]`, per
/// `spec.md` §4.B.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HelloMessage {
    /// The base (`p2p`) protocol version this node speaks; `5` enables
    /// snappy compression for sub-protocol bodies.
    pub protocol_version: u8,
    /// A free-form client identifier string, e.g. `"reth/v1.0.0"`.
    pub client_version: String,
    /// Sub-protocols this node offers.
    pub capabilities: Vec<Capability>,
    /// The TCP port this node accepts inbound connections on.
    pub port: u16,
    /// This node's public identity.
    pub id: PeerId,
}

impl HelloMessage {
    /// Message ID of `HELLO` within the base protocol, before any
    /// capability offset.
    pub const MESSAGE_ID: u8 = 0x00;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::{Decodable, Encodable};

    #[test]
    fn encodes_and_decodes() {
        let hello = HelloMessage {
            protocol_version: 5,
            client_version: "reth/test".to_string(),
            capabilities: vec![Capability::eth(68)],
            port: 30303,
            id: PeerId::ZERO,
        };
        let mut buf = Vec::new();
        hello.encode(&mut buf);
        let decoded = HelloMessage::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, hello);
    }
}
