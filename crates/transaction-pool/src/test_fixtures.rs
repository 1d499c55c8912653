//! Signed-transaction fixtures for tests: real `secp256k1` signing so that
//! two transactions from "the same sender" actually recover to the same
//! address, unlike a fixed dummy signature.

#![cfg(test)]

use alloy_consensus::{transaction::SignableTransaction, TxEip1559};
use alloy_primitives::{Address, Signature, TxKind, U256};
use reth_primitives::{Transaction, TransactionSigned};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};

/// A deterministic test keypair derived from `seed` (1-255).
pub fn test_key(seed: u8) -> (SecretKey, Address) {
    let mut bytes = [0x11; 32];
    bytes[31] = seed;
    let secret = SecretKey::from_slice(&bytes).expect("valid scalar");
    let public = PublicKey::from_secret_key(SECP256K1, &secret);
    let uncompressed = public.serialize_uncompressed();
    let hash = alloy_primitives::keccak256(&uncompressed[1..]);
    let address = Address::from_slice(&hash[12..]);
    (secret, address)
}

/// Builds and signs an EIP-1559 transaction with the given sender key,
/// nonce, and max fee; `value`/`gas_limit` default to small fixed values.
pub fn signed_fee_market_tx(
    key: &SecretKey,
    nonce: u64,
    max_fee_per_gas: u128,
    gas_limit: u64,
) -> TransactionSigned {
    let tx = Transaction::FeeMarket(TxEip1559 {
        chain_id: 1,
        nonce,
        max_priority_fee_per_gas: max_fee_per_gas,
        max_fee_per_gas,
        gas_limit,
        to: TxKind::Call(Address::ZERO),
        value: U256::from(1u64),
        input: Default::default(),
        access_list: Default::default(),
    });

    let sighash = tx.signature_hash();
    let message = Message::from_digest(sighash.0);
    let (recovery_id, compact) = SECP256K1.sign_ecdsa_recoverable(&message, key).serialize_compact();

    let r = U256::from_be_slice(&compact[..32]);
    let s = U256::from_be_slice(&compact[32..]);
    let signature = Signature::new(r, s, recovery_id.to_i32() != 0);

    TransactionSigned::new_unhashed(tx, signature)
}
