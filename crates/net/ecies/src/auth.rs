//! EIP-8 RLP bodies for the Auth and Ack handshake messages.

use alloy_rlp::{RlpDecodable, RlpEncodable};

/// `[signature, initiator-pubkey, initiator-nonce, auth-vsn]`.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable)]
pub struct AuthBody {
    /// 65-byte recoverable ECDSA signature over `static-shared-secret ^ nonce`.
    pub signature: Vec<u8>,
    /// The initiator's 64-byte uncompressed static public key (no `0x04` prefix).
    pub initiator_pubkey: Vec<u8>,
    /// The initiator's 32-byte nonce.
    pub nonce: Vec<u8>,
    /// Handshake version; `4` for every EIP-8 peer in practice.
    pub auth_vsn: u8,
}

/// `[recipient-ephemeral-pubkey, recipient-nonce, ack-vsn]`.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable)]
pub struct AckBody {
    /// The recipient's 64-byte uncompressed ephemeral public key.
    pub ephemeral_pubkey: Vec<u8>,
    /// The recipient's 32-byte nonce.
    pub nonce: Vec<u8>,
    /// Handshake version; `4` for every EIP-8 peer in practice.
    pub ack_vsn: u8,
}
