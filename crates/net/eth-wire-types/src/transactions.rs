//! The four `eth` sub-protocol messages the pool cares about, per
//! `spec.md` §4.C: `Transactions`, `NewPooledTransactionHashes`,
//! `GetPooledTransactions`, `PooledTransactions`.

use alloy_primitives::B256;
use alloy_rlp::{Decodable, Encodable, Header};
use reth_primitives::TransactionSigned;

use crate::status::Status;

/// `eth` sub-protocol versions this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EthVersion {
    /// `eth/66`.
    Eth66 = 66,
    /// `eth/67`.
    Eth67 = 67,
    /// `eth/68`.
    Eth68 = 68,
}

impl EthVersion {
    /// The numeric protocol version.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Wraps a request/response body with the `eth/66+` request id, so replies
/// can be matched to their request out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPair<T> {
    /// Caller-chosen identifier, echoed back in the response.
    pub request_id: u64,
    /// The request or response payload.
    pub message: T,
}

impl<T: Encodable> Encodable for RequestPair<T> {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        let payload_length = self.request_id.length() + self.message.length();
        Header { list: true, payload_length }.encode(out);
        self.request_id.encode(out);
        self.message.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.request_id.length() + self.message.length();
        Header { list: true, payload_length }.length() + payload_length
    }
}

impl<T: Decodable> Decodable for RequestPair<T> {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let request_id = u64::decode(buf)?;
        let message = T::decode(buf)?;
        Ok(Self { request_id, message })
    }
}

/// `Transactions`: a gossiped batch of full transactions, unsolicited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transactions(pub Vec<TransactionSigned>);

impl Encodable for Transactions {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for Transactions {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self(Vec::<TransactionSigned>::decode(buf)?))
    }
}

/// `NewPooledTransactionHashes`: announces hashes without sending bodies;
/// the recipient follows up with `GetPooledTransactions` for any it lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPooledTransactionHashes(pub Vec<B256>);

impl Encodable for NewPooledTransactionHashes {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for NewPooledTransactionHashes {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self(Vec::<B256>::decode(buf)?))
    }
}

/// `GetPooledTransactions`: a request for the full bodies of previously
/// announced hashes.
pub type GetPooledTransactions = RequestPair<Vec<B256>>;

/// `PooledTransactions`: the response to `GetPooledTransactions`.
pub type PooledTransactions = RequestPair<Vec<TransactionSigned>>;

/// Every `eth` sub-protocol message this crate models, tagged with its
/// message ID (added to the capability's negotiated offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthMessage {
    /// `0x00`.
    Status(Status),
    /// `0x02`.
    Transactions(Transactions),
    /// `0x08`.
    NewPooledTransactionHashes(NewPooledTransactionHashes),
    /// `0x09`.
    GetPooledTransactions(GetPooledTransactions),
    /// `0x0a`.
    PooledTransactions(PooledTransactions),
}

impl EthMessage {
    /// The message ID within the `eth` sub-protocol, before the negotiated
    /// capability offset is added.
    pub const fn message_id(&self) -> u8 {
        match self {
            Self::Status(_) => 0x00,
            Self::Transactions(_) => 0x02,
            Self::NewPooledTransactionHashes(_) => 0x08,
            Self::GetPooledTransactions(_) => 0x09,
            Self::PooledTransactions(_) => 0x0a,
        }
    }

    /// Encodes `[message_id, ...payload]` into `out`.
    pub fn encode_message(&self, out: &mut dyn bytes::BufMut) {
        self.message_id().encode(out);
        match self {
            Self::Status(msg) => msg.encode(out),
            Self::Transactions(msg) => msg.encode(out),
            Self::NewPooledTransactionHashes(msg) => msg.encode(out),
            Self::GetPooledTransactions(msg) => msg.encode(out),
            Self::PooledTransactions(msg) => msg.encode(out),
        }
    }

    /// Decodes an `eth` sub-protocol payload given its in-protocol message
    /// id (the wire id with the negotiated capability offset already
    /// subtracted off).
    pub fn decode_with_id(id: u8, buf: &mut &[u8]) -> Result<Self, crate::error::MessageError> {
        Ok(match id {
            0x00 => Self::Status(Status::decode(buf)?),
            0x02 => Self::Transactions(Transactions::decode(buf)?),
            0x08 => Self::NewPooledTransactionHashes(NewPooledTransactionHashes::decode(buf)?),
            0x09 => Self::GetPooledTransactions(GetPooledTransactions::decode(buf)?),
            0x0a => Self::PooledTransactions(PooledTransactions::decode(buf)?),
            other => return Err(crate::error::MessageError::Invalid(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pooled_transaction_hashes_round_trips() {
        let msg = NewPooledTransactionHashes(vec![B256::repeat_byte(1), B256::repeat_byte(2)]);
        let mut buf = Vec::new();
        msg.encode(&mut buf);
        assert_eq!(NewPooledTransactionHashes::decode(&mut buf.as_slice()).unwrap(), msg);
    }

    #[test]
    fn get_pooled_transactions_request_pair_round_trips() {
        let req = GetPooledTransactions { request_id: 7, message: vec![B256::repeat_byte(9)] };
        let mut buf = Vec::new();
        req.encode(&mut buf);
        assert_eq!(GetPooledTransactions::decode(&mut buf.as_slice()).unwrap(), req);
    }
}
