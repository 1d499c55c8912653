//! The base (`p2p`) protocol's reserved messages, occupying codes `0x00`
//! through `0x03` before any capability offset, per `spec.md` §4.B.

use alloy_rlp::{Decodable, Encodable, EMPTY_LIST_CODE};
use bytes::BufMut;

use crate::{disconnect::DisconnectReason, error::MessageError, hello::HelloMessage};

/// Reserved base-protocol message codes, before the capability offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum P2PMessage {
    /// `0x00`.
    Hello(HelloMessage),
    /// `0x01`.
    Disconnect(DisconnectReason),
    /// `0x02`, an empty RLP list.
    Ping,
    /// `0x03`, an empty RLP list.
    Pong,
}

impl P2PMessage {
    /// The reserved message ID, before any capability offset is added.
    pub const fn message_id(&self) -> u8 {
        match self {
            Self::Hello(_) => 0x00,
            Self::Disconnect(_) => 0x01,
            Self::Ping => 0x02,
            Self::Pong => 0x03,
        }
    }

    /// Encodes `[message_id, ...payload]` into `out`.
    pub fn encode_message(&self, out: &mut dyn BufMut) {
        self.message_id().encode(out);
        match self {
            Self::Hello(hello) => hello.encode(out),
            Self::Disconnect(reason) => reason.encode(out),
            Self::Ping | Self::Pong => out.put_u8(EMPTY_LIST_CODE),
        }
    }

    /// Decodes a reserved base-protocol message from a full frame buffer
    /// (message ID byte followed by its RLP payload).
    pub fn decode_message(buf: &mut &[u8]) -> Result<Self, MessageError> {
        let id = u8::decode(buf)?;
        Ok(match id {
            0x00 => Self::Hello(HelloMessage::decode(buf)?),
            0x01 => Self::Disconnect(DisconnectReason::decode(buf)?),
            0x02 => Self::Ping,
            0x03 => Self::Pong,
            other => return Err(MessageError::Invalid(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use alloy_primitives::B512;

    #[test]
    fn ping_round_trips() {
        let mut buf = Vec::new();
        P2PMessage::Ping.encode_message(&mut buf);
        assert_eq!(P2PMessage::decode_message(&mut buf.as_slice()).unwrap(), P2PMessage::Ping);
    }

    #[test]
    fn hello_round_trips() {
        let hello = HelloMessage {
            protocol_version: 5,
            client_version: "reth/test".to_string(),
            capabilities: vec![Capability::eth(68)],
            port: 30303,
            id: B512::ZERO,
        };
        let mut buf = Vec::new();
        P2PMessage::Hello(hello.clone()).encode_message(&mut buf);
        assert_eq!(P2PMessage::decode_message(&mut buf.as_slice()).unwrap(), P2PMessage::Hello(hello));
    }
}
