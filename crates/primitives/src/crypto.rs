//! `secp256k1`-backed sender recovery, mirroring the helper `reth`'s
//! `reth-primitives-traits::crypto::secp256k1` module exposes.

use alloy_primitives::{Address, Signature, B256, U256};

/// `secp256k1`'s curve order divided by two. A signature with `s` above this
/// value is malleable (EIP-2) and is only accepted on the unchecked
/// (legacy, pre-Homestead) recovery path.
const SECP256K1_HALF_N: U256 = U256::from_be_bytes([
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
    0x20, 0xa0,
]);

/// Error recovering a signer address from a transaction signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// The signature's recovery id or `r`/`s` values were not a valid
    /// `secp256k1` recoverable signature.
    #[error("invalid signature")]
    InvalidSignature,
    /// The signature's `s` value was above half the curve order (EIP-2
    /// malleability) on a path that requires normalized signatures.
    #[error("signature s-value is malleable")]
    MalleableSignature,
}

/// Recovers the signer address from `signature` over the 32-byte message
/// `hash`, rejecting malleable (high-`s`) signatures per EIP-2.
pub fn recover_signer(signature: &Signature, hash: B256) -> Result<Address, RecoveryError> {
    if signature.s() > SECP256K1_HALF_N {
        return Err(RecoveryError::MalleableSignature);
    }
    recover_signer_unchecked(signature, hash)
}

/// Recovers the signer address without checking signature malleability.
/// Used for the legacy (pre-EIP-2) signature space, which allows both
/// low-`s` and high-`s` values.
pub fn recover_signer_unchecked(
    signature: &Signature,
    hash: B256,
) -> Result<Address, RecoveryError> {
    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
    sig[32..].copy_from_slice(&signature.s().to_be_bytes::<32>());

    let recovery_id = secp256k1::ecdsa::RecoveryId::from_i32(i32::from(signature.v()))
        .map_err(|_| RecoveryError::InvalidSignature)?;
    let recoverable_sig = secp256k1::ecdsa::RecoverableSignature::from_compact(&sig, recovery_id)
        .map_err(|_| RecoveryError::InvalidSignature)?;

    let message = secp256k1::Message::from_digest(hash.0);

    let public = secp256k1::SECP256K1
        .recover_ecdsa(&message, &recoverable_sig)
        .map_err(|_| RecoveryError::InvalidSignature)?;

    Ok(public_key_to_address(public))
}

fn public_key_to_address(public: secp256k1::PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    debug_assert_eq!(uncompressed[0], 0x04);
    let hash = alloy_primitives::keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}
