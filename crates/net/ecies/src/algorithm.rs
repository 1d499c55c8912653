//! ECIES encrypt/decrypt over `secp256k1`, used for the Auth and Ack
//! messages. Key agreement is plain ECDH on the x-coordinate; key
//! derivation is the NIST SP 800-56 concatenation KDF with SHA-256, split
//! into an AES-128 key and an HMAC-SHA-256 key, matching the scheme
//! `devp2p`'s RLPx handshake specifies.

use aes::cipher::{KeyIvInit, StreamCipher};
use digest::Digest;
use hmac::{Hmac, Mac as HmacMac};
use rand::Rng;
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use sha2::Sha256;

use crate::error::{ECIESError, Result};

/// The raw (unhashed) X coordinate of `secret * public`, i.e. Diffie-Hellman
/// point multiplication without `secp256k1`'s default SHA-256 digest of the
/// shared point. RLPx's key derivation hashes this raw value itself, so the
/// crate's usual [`secp256k1::ecdh::SharedSecret`] (which pre-hashes) cannot
/// be reused here.
pub(crate) fn raw_shared_secret(public: &PublicKey, secret: &SecretKey) -> [u8; 32] {
    let point = secp256k1::ecdh::shared_secret_point(public, secret);
    let mut x = [0u8; 32];
    x.copy_from_slice(&point[..32]);
    x
}

type Aes128Ctr64BE = ctr::Ctr64BE<aes::Aes128>;

const KEY_LEN: usize = 16;

/// NIST SP 800-56 concatenation KDF: derives `len` bytes from `secret`.
fn concat_kdf(secret: &[u8], len: usize) -> Vec<u8> {
    let mut output = Vec::with_capacity(len + Sha256::output_size());
    let mut counter: u32 = 1;
    while output.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(counter.to_be_bytes());
        hasher.update(secret);
        output.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    output.truncate(len);
    output
}

fn derive_keys(shared_secret: &[u8]) -> ([u8; KEY_LEN], [u8; 32]) {
    let derived = concat_kdf(shared_secret, KEY_LEN * 2);
    let mut enc_key = [0u8; KEY_LEN];
    enc_key.copy_from_slice(&derived[..KEY_LEN]);
    let mac_material = &derived[KEY_LEN..];
    let mac_key: [u8; 32] = Sha256::digest(mac_material).into();
    (enc_key, mac_key)
}

/// Encrypts `message` to `recipient_public`, authenticating `shared_mac_data`
/// (the EIP-8 total-length prefix) alongside it. Returns `ephemeral pubkey
/// (65B) || iv (16B) || ciphertext || tag (32B)`.
pub fn encrypt_message(
    recipient_public: &PublicKey,
    message: &[u8],
    shared_mac_data: &[u8],
) -> Result<Vec<u8>> {
    let ephemeral_secret = SecretKey::new(&mut rand::thread_rng());
    let ephemeral_public = PublicKey::from_secret_key(SECP256K1, &ephemeral_secret);

    let shared = raw_shared_secret(recipient_public, &ephemeral_secret);
    let (enc_key, mac_key) = derive_keys(&shared);

    let iv: [u8; 16] = rand::thread_rng().gen();
    let mut ciphertext = message.to_vec();
    let mut cipher = Aes128Ctr64BE::new((&enc_key).into(), (&iv).into());
    cipher.apply_keystream(&mut ciphertext);

    let mut tag_input = Vec::with_capacity(iv.len() + ciphertext.len() + shared_mac_data.len());
    tag_input.extend_from_slice(&iv);
    tag_input.extend_from_slice(&ciphertext);
    tag_input.extend_from_slice(shared_mac_data);
    let mut mac = Hmac::<Sha256>::new_from_slice(&mac_key).expect("hmac accepts any key length");
    mac.update(&tag_input);
    let tag = mac.finalize().into_bytes();

    let mut out = Vec::with_capacity(65 + 16 + ciphertext.len() + 32);
    out.extend_from_slice(&ephemeral_public.serialize_uncompressed());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);
    Ok(out)
}

/// Decrypts a message produced by [`encrypt_message`] using `recipient_secret`.
pub fn decrypt_message(
    recipient_secret: &SecretKey,
    data: &[u8],
    shared_mac_data: &[u8],
) -> Result<Vec<u8>> {
    const HEADER_LEN: usize = 65 + 16;
    if data.len() < HEADER_LEN + 32 {
        return Err(ECIESError::InvalidMessageLength {
            expected: HEADER_LEN + 32,
            actual: data.len(),
        });
    }

    let ephemeral_public = PublicKey::from_slice(&data[..65])?;
    let iv = &data[65..81];
    let ciphertext_and_tag = &data[81..];
    let (ciphertext, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - 32);

    let shared = raw_shared_secret(&ephemeral_public, recipient_secret);
    let (enc_key, mac_key) = derive_keys(&shared);

    let mut tag_input = Vec::with_capacity(iv.len() + ciphertext.len() + shared_mac_data.len());
    tag_input.extend_from_slice(iv);
    tag_input.extend_from_slice(ciphertext);
    tag_input.extend_from_slice(shared_mac_data);
    let mut mac = Hmac::<Sha256>::new_from_slice(&mac_key).expect("hmac accepts any key length");
    mac.update(&tag_input);
    mac.verify_slice(tag)
        .map_err(|_| ECIESError::TagCheckFailed)?;

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Aes128Ctr64BE::new(
        (&enc_key).into(),
        <&[u8; 16]>::try_from(iv).expect("iv is 16 bytes").into(),
    );
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encrypt_and_decrypt() {
        let recipient_secret = SecretKey::new(&mut rand::thread_rng());
        let recipient_public = PublicKey::from_secret_key(SECP256K1, &recipient_secret);

        let message = b"a handshake payload";
        let encrypted = encrypt_message(&recipient_public, message, b"shared").unwrap();
        let decrypted = decrypt_message(&recipient_secret, &encrypted, b"shared").unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn mismatched_shared_mac_data_fails_the_tag_check() {
        let recipient_secret = SecretKey::new(&mut rand::thread_rng());
        let recipient_public = PublicKey::from_secret_key(SECP256K1, &recipient_secret);

        let encrypted = encrypt_message(&recipient_public, b"hi", b"left").unwrap();
        let err = decrypt_message(&recipient_secret, &encrypted, b"right").unwrap_err();
        assert!(matches!(err, ECIESError::TagCheckFailed));
    }
}
