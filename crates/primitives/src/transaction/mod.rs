//! The `Transaction` data model: a tagged union over the three transaction
//! shapes this system admits (legacy, EIP-2930 access-list, EIP-1559 fee
//! market), reusing `alloy-consensus`'s envelope types directly.

pub mod signed;

use alloy_consensus::{TxEip1559, TxEip2930, TxLegacy, TxType};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Bytes, ChainId, TxKind, U256};
use alloy_rlp::BufMut;

macro_rules! delegate {
    ($self:expr => $tx:ident.$method:ident($($arg:expr),*)) => {
        match $self {
            Transaction::Legacy($tx) => $tx.$method($($arg),*),
            Transaction::AccessList($tx) => $tx.$method($($arg),*),
            Transaction::FeeMarket($tx) => $tx.$method($($arg),*),
        }
    };
}

/// A raw, unsigned transaction body.
///
/// Only the three shapes `spec.md` names are modeled; EIP-4844 blob and
/// EIP-7702 set-code transactions are out of scope (see `SPEC_FULL.md` §1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Transaction {
    /// Legacy transaction (type `0x0`): `nonce`, `gasPrice`, `gasLimit`, `to`,
    /// `value`, `data`.
    Legacy(TxLegacy),
    /// EIP-2930 transaction (type `0x1`): adds an `accessList`.
    AccessList(TxEip2930),
    /// EIP-1559 fee-market transaction (type `0x2`): replaces `gasPrice` with
    /// `maxFeePerGas`/`maxPriorityFeePerGas`.
    FeeMarket(TxEip1559),
}

impl Transaction {
    /// Returns the [`TxType`] of the transaction.
    pub const fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::AccessList(_) => TxType::Eip2930,
            Self::FeeMarket(_) => TxType::Eip1559,
        }
    }

    /// `getUpfrontCost(baseFee) = gasLimit * effectiveGasPrice(baseFee) + value`.
    pub fn upfront_cost(&self, base_fee: u64) -> U256 {
        let price = self.effective_gas_price(Some(base_fee));
        U256::from(self.gas_limit()) * U256::from(price) + self.value()
    }

    /// Sets the transaction's nonce. Used by pool replacement tests that
    /// construct fixtures in place.
    pub fn set_nonce(&mut self, nonce: u64) {
        match self {
            Self::Legacy(tx) => tx.nonce = nonce,
            Self::AccessList(tx) => tx.nonce = nonce,
            Self::FeeMarket(tx) => tx.nonce = nonce,
        }
    }
}

impl alloy_eips::eip2718::Typed2718 for Transaction {
    fn ty(&self) -> u8 {
        delegate!(self => tx.ty())
    }
}

impl alloy_consensus::Transaction for Transaction {
    fn chain_id(&self) -> Option<ChainId> {
        delegate!(self => tx.chain_id())
    }

    fn nonce(&self) -> u64 {
        delegate!(self => tx.nonce())
    }

    fn gas_limit(&self) -> u64 {
        delegate!(self => tx.gas_limit())
    }

    fn gas_price(&self) -> Option<u128> {
        delegate!(self => tx.gas_price())
    }

    fn max_fee_per_gas(&self) -> u128 {
        delegate!(self => tx.max_fee_per_gas())
    }

    fn max_priority_fee_per_gas(&self) -> Option<u128> {
        delegate!(self => tx.max_priority_fee_per_gas())
    }

    fn max_fee_per_blob_gas(&self) -> Option<u128> {
        delegate!(self => tx.max_fee_per_blob_gas())
    }

    fn priority_fee_or_price(&self) -> u128 {
        delegate!(self => tx.priority_fee_or_price())
    }

    fn effective_gas_price(&self, base_fee: Option<u64>) -> u128 {
        delegate!(self => tx.effective_gas_price(base_fee))
    }

    fn is_dynamic_fee(&self) -> bool {
        delegate!(self => tx.is_dynamic_fee())
    }

    fn kind(&self) -> TxKind {
        delegate!(self => tx.kind())
    }

    fn is_create(&self) -> bool {
        delegate!(self => tx.is_create())
    }

    fn value(&self) -> U256 {
        delegate!(self => tx.value())
    }

    fn input(&self) -> &Bytes {
        delegate!(self => tx.input())
    }

    fn access_list(&self) -> Option<&AccessList> {
        delegate!(self => tx.access_list())
    }

    fn blob_versioned_hashes(&self) -> Option<&[alloy_primitives::B256]> {
        delegate!(self => tx.blob_versioned_hashes())
    }

    fn authorization_list(&self) -> Option<&[alloy_eips::eip7702::SignedAuthorization]> {
        delegate!(self => tx.authorization_list())
    }
}

impl alloy_consensus::SignableTransaction<alloy_primitives::Signature> for Transaction {
    fn set_chain_id(&mut self, chain_id: ChainId) {
        delegate!(self => tx.set_chain_id(chain_id))
    }

    fn encode_for_signing(&self, out: &mut dyn BufMut) {
        delegate!(self => tx.encode_for_signing(out))
    }

    fn payload_len_for_signature(&self) -> usize {
        delegate!(self => tx.payload_len_for_signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upfront_cost_matches_test_vector() {
        let tx = Transaction::FeeMarket(TxEip1559 {
            max_fee_per_gas: 10,
            max_priority_fee_per_gas: 8,
            gas_limit: 100,
            value: U256::from(6),
            ..Default::default()
        });

        assert_eq!(tx.upfront_cost(0), U256::from(806));
        assert_eq!(tx.upfront_cost(4), U256::from(1006));
    }
}
