//! The `DISCONNECT` reason codes, canonical per `spec.md` §6.

use alloy_rlp::{Decodable, Encodable, Header};
use bytes::BufMut;

use crate::error::MessageError;

/// Why a peer session ended. Encoded on the wire as a single-element RLP
/// list wrapping this byte, per devp2p convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisconnectReason {
    /// Requested by the disconnecting peer's local user.
    DisconnectRequested = 0x00,
    /// A low-level network or transport error.
    NetworkError = 0x01,
    /// A protocol-breaking message or framing error.
    ProtocolError = 0x02,
    /// No overlapping sub-protocols were negotiated.
    UselessPeer = 0x03,
    /// Too many peers are already connected.
    TooManyPeers = 0x04,
    /// Already connected to this peer's identity.
    AlreadyConnected = 0x05,
    /// The peer's `HELLO` protocol version is incompatible.
    IncompatibleVersion = 0x06,
    /// The peer's node ID is invalid.
    InvalidIdentity = 0x07,
    /// The local client is shutting down.
    ClientQuitting = 0x08,
    /// The peer's identity didn't match the expected one.
    UnexpectedIdentity = 0x09,
    /// The peer connected to itself.
    SameIdentity = 0x0a,
    /// A keepalive PING was not answered in time.
    Timeout = 0x0b,
    /// A sub-protocol specific error.
    SubprotocolError = 0x10,
}

impl DisconnectReason {
    /// The canonical wire byte for this reason.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for DisconnectReason {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::DisconnectRequested,
            0x01 => Self::NetworkError,
            0x02 => Self::ProtocolError,
            0x03 => Self::UselessPeer,
            0x04 => Self::TooManyPeers,
            0x05 => Self::AlreadyConnected,
            0x06 => Self::IncompatibleVersion,
            0x07 => Self::InvalidIdentity,
            0x08 => Self::ClientQuitting,
            0x09 => Self::UnexpectedIdentity,
            0x0a => Self::SameIdentity,
            0x0b => Self::Timeout,
            0x10 => Self::SubprotocolError,
            other => return Err(MessageError::UnknownDisconnectReason(other)),
        })
    }
}

impl Encodable for DisconnectReason {
    fn encode(&self, out: &mut dyn BufMut) {
        // devp2p wraps the reason in a one-element RLP list.
        Header { list: true, payload_length: 1 }.encode(out);
        self.as_u8().encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = 1;
        Header { list: true, payload_length }.length() + payload_length
    }
}

impl Decodable for DisconnectReason {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        if buf.is_empty() {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let reason = u8::decode(buf)?;
        Self::try_from(reason).map_err(|_| alloy_rlp::Error::Custom("unknown disconnect reason"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_reason_round_trips_through_its_byte() {
        let reasons = [
            (DisconnectReason::DisconnectRequested, 0x00),
            (DisconnectReason::NetworkError, 0x01),
            (DisconnectReason::ProtocolError, 0x02),
            (DisconnectReason::UselessPeer, 0x03),
            (DisconnectReason::TooManyPeers, 0x04),
            (DisconnectReason::AlreadyConnected, 0x05),
            (DisconnectReason::IncompatibleVersion, 0x06),
            (DisconnectReason::InvalidIdentity, 0x07),
            (DisconnectReason::ClientQuitting, 0x08),
            (DisconnectReason::UnexpectedIdentity, 0x09),
            (DisconnectReason::SameIdentity, 0x0a),
            (DisconnectReason::Timeout, 0x0b),
            (DisconnectReason::SubprotocolError, 0x10),
        ];
        for (reason, byte) in reasons {
            assert_eq!(reason.as_u8(), byte);
            assert_eq!(DisconnectReason::try_from(byte).unwrap(), reason);
        }
    }

    #[test]
    fn rlp_round_trips() {
        let mut buf = Vec::new();
        DisconnectReason::TooManyPeers.encode(&mut buf);
        let decoded = DisconnectReason::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, DisconnectReason::TooManyPeers);
    }

    #[test]
    fn unknown_byte_is_rejected() {
        assert!(DisconnectReason::try_from(0xff).is_err());
    }
}
