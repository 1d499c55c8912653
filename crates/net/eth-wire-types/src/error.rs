/// Errors decoding or validating wire protocol messages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MessageError {
    /// A message ID was outside the range either the base protocol or the
    /// negotiated sub-protocol defines.
    #[error("message id {0} out of range")]
    Invalid(u8),
    /// A `DISCONNECT` reason byte did not match any known reason.
    #[error("unknown disconnect reason: {0}")]
    UnknownDisconnectReason(u8),
    /// RLP decoding the message body failed.
    #[error("RLP decode error: {0}")]
    Rlp(alloy_rlp::Error),
}

impl From<alloy_rlp::Error> for MessageError {
    fn from(value: alloy_rlp::Error) -> Self {
        Self::Rlp(value)
    }
}
