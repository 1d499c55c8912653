//! The RLPx header/body MAC ratchet: a running KECCAK-256 state that absorbs
//! an AES-256 block-cipher "whitening" step before every digest is taken,
//! per the RLPx specification's `mac-update` construction.
//!
//! No teacher source was retrieved for this crate; grounded directly on
//! `spec.md` §4.A/§6's framing description (see `DESIGN.md`).

use aes::{
    cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit},
    Aes256,
};
use sha3::{Digest, Keccak256};

/// One direction (ingress or egress) of the MAC ratchet.
pub struct Mac {
    cipher: Aes256,
    hasher: Keccak256,
}

impl Mac {
    /// Creates a MAC state keyed with `secret` (the `mac-secret` derived
    /// from the ECIES shared secret). Callers prime the running hash by
    /// calling [`Self::update`] with `mac-secret ^ nonce` followed by the
    /// full Auth/Ack ciphertext, per the RLPx handshake's MAC setup.
    pub fn new(secret: [u8; 32]) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(&secret));
        Self {
            cipher,
            hasher: Keccak256::new(),
        }
    }

    /// Absorbs `data` into the running hash without producing a MAC value.
    /// Used for the raw ciphertext update the body MAC performs before its
    /// whitening step.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// The core RLPx `mac-update` step: whiten the current digest through
    /// the block cipher, XOR it against `data` (which must be exactly one
    /// AES block), absorb the result, and return the new 16-byte digest.
    pub fn update_and_digest(&mut self, data: &[u8; 16]) -> [u8; 16] {
        let digest = self.digest();
        let mut block = GenericArray::clone_from_slice(&digest);
        self.cipher.encrypt_block(&mut block);
        let mut result = [0u8; 16];
        for i in 0..16 {
            result[i] = block[i] ^ data[i];
        }
        self.hasher.update(result);
        self.digest()
    }

    /// Computes the MAC for a 16-byte encrypted frame header.
    pub fn header_mac(&mut self, header_ciphertext: &[u8; 16]) -> [u8; 16] {
        self.update_and_digest(header_ciphertext)
    }

    /// Computes the MAC for a frame body: the raw ciphertext is absorbed
    /// first, then the running digest itself is whitened.
    pub fn body_mac(&mut self, body_ciphertext: &[u8]) -> [u8; 16] {
        self.update(body_ciphertext);
        let digest = self.digest();
        self.update_and_digest(&digest)
    }

    /// The first 16 bytes of the running KECCAK-256 digest, without
    /// consuming the hasher (it is cheaply cloned to peek).
    pub fn digest(&self) -> [u8; 16] {
        let out = self.hasher.clone().finalize();
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&out[..16]);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_mac_is_deterministic_given_identical_state() {
        let mut a = Mac::new([1u8; 32]);
        a.update(b"seed");
        let mut b = Mac::new([1u8; 32]);
        b.update(b"seed");
        let header = [7u8; 16];
        assert_eq!(a.header_mac(&header), b.header_mac(&header));
    }

    #[test]
    fn diverging_input_diverges_the_mac() {
        let mut a = Mac::new([1u8; 32]);
        a.update(b"seed");
        let mut b = Mac::new([1u8; 32]);
        b.update(b"seed");
        assert_ne!(a.header_mac(&[1u8; 16]), b.header_mac(&[2u8; 16]));
    }
}
