/// Errors produced by the ECIES handshake state machine.
///
/// Per `spec.md` §4.A, every variant here is session-fatal: the caller must
/// surface a `DISCONNECT(PROTOCOL_ERROR)` and tear the connection down.
#[derive(Debug, thiserror::Error)]
pub enum ECIESError {
    /// The MAC appended to a header or body frame did not match.
    #[error("MAC mismatch")]
    TagCheckFailed,
    /// An Auth/Ack/header/body buffer was shorter than required.
    #[error("message too short, need at least {expected} bytes, got {actual}")]
    InvalidMessageLength {
        /// Minimum required length.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// RLP-decoding the Auth/Ack body failed.
    #[error("RLP decode error: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    /// A `secp256k1` operation (ECDH, signing, recovery) failed.
    #[error("secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),
    /// The handshake reached a state transition that is invalid for the
    /// caller's role (e.g. a responder tried to read an Ack).
    #[error("unexpected ECIES state")]
    UnexpectedState,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ECIESError>;
