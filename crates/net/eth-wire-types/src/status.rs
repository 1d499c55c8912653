//! The `eth` sub-protocol's `Status` handshake message. Not named by
//! `spec.md` beyond "STATUS handshake"; specified fully here since the
//! pool-facing messages cannot be validated without it (a peer whose
//! network id or genesis disagrees must be rejected first).

use alloy_primitives::{B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// `eth`'s fork identifier: a CRC32 hash of past fork block numbers plus the
/// next scheduled fork, used to reject peers on an incompatible fork
/// without needing a full chain spec exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForkId {
    /// CRC32 checksum of all past fork blocks.
    pub hash: [u8; 4],
    /// Block number or timestamp of the next fork, `0` if none scheduled.
    pub next: u64,
}

/// The first message exchanged on the `eth` sub-protocol, immediately after
/// capability negotiation. A mismatched `network_id` or `genesis` must be
/// rejected before any other `eth` message is accepted.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// The `eth` sub-protocol version, e.g. `68`.
    pub version: u8,
    /// The network (chain) id.
    pub network_id: u64,
    /// Total difficulty of the peer's best known chain.
    pub total_difficulty: U256,
    /// Hash of the peer's best known block.
    pub blockhash: B256,
    /// Hash of the chain's genesis block.
    pub genesis: B256,
    /// The peer's current fork identifier.
    pub fork_id: ForkId,
}

impl Status {
    /// Returns `true` if `other`'s network id and genesis hash allow a
    /// session to proceed, per `spec.md`'s transport-fatal handling of
    /// handshake mismatches.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.network_id == other.network_id && self.genesis == other.genesis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::{Decodable, Encodable};

    fn sample(network_id: u64, genesis: B256) -> Status {
        Status {
            version: 68,
            network_id,
            total_difficulty: U256::from(17),
            blockhash: B256::repeat_byte(0xab),
            genesis,
            fork_id: ForkId { hash: [1, 2, 3, 4], next: 0 },
        }
    }

    #[test]
    fn round_trips() {
        let status = sample(1, B256::repeat_byte(0x11));
        let mut buf = Vec::new();
        status.encode(&mut buf);
        assert_eq!(Status::decode(&mut buf.as_slice()).unwrap(), status);
    }

    #[test]
    fn mismatched_network_id_is_incompatible() {
        let genesis = B256::repeat_byte(0x11);
        let local = sample(1, genesis);
        let remote = sample(5, genesis);
        assert!(!local.is_compatible_with(&remote));
    }

    #[test]
    fn mismatched_genesis_is_incompatible() {
        let local = sample(1, B256::repeat_byte(0x11));
        let remote = sample(1, B256::repeat_byte(0x22));
        assert!(!local.is_compatible_with(&remote));
    }
}
