//! The RLPx handshake + framing state machine: `Auth -> Ack -> Header ->
//! Body`, per `spec.md` §4.A/§4.B.

use aes::cipher::{KeyIvInit, StreamCipher};
use alloy_rlp::{Decodable, Encodable};
use rand::Rng;
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use sha3::{Digest, Keccak256};
use tracing::trace;

use crate::{
    algorithm::{decrypt_message, encrypt_message, raw_shared_secret},
    auth::{AckBody, AuthBody},
    error::{ECIESError, Result},
    mac::Mac,
};

type Aes256Ctr64BE = ctr::Ctr64BE<aes::Aes256>;

/// Which side of the handshake this state machine plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Dialed out; sends Auth first.
    Initiator,
    /// Accepted a connection; waits for Auth.
    Recipient,
}

/// The four states `spec.md` §4.A names: handshake (`Auth`, `Ack`) and
/// steady-state framing (`Header`, `Body`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting to send or receive Auth.
    Auth,
    /// Auth exchanged; waiting to send or receive Ack.
    Ack,
    /// Handshake complete; waiting for a frame header.
    Header,
    /// Header parsed; waiting for the frame body it announced.
    Body,
}

/// Ephemeral handshake + per-direction framing state for one RLPx
/// connection. Destroyed on connection close, per `spec.md`'s `EciesState`
/// lifecycle note.
pub struct EciesState {
    role: Role,
    state: HandshakeState,

    static_secret_key: SecretKey,
    remote_static_public: Option<PublicKey>,

    ephemeral_secret_key: SecretKey,
    remote_ephemeral_public: Option<PublicKey>,

    nonce: [u8; 32],
    remote_nonce: Option<[u8; 32]>,

    init_msg: Option<Vec<u8>>,
    remote_init_msg: Option<Vec<u8>>,
    ack_msg: Option<Vec<u8>>,
    remote_ack_msg: Option<Vec<u8>>,

    ingress_mac: Option<Mac>,
    egress_mac: Option<Mac>,
    ingress_aes: Option<Aes256Ctr64BE>,
    egress_aes: Option<Aes256Ctr64BE>,

    next_body_size: Option<usize>,
}

impl EciesState {
    /// Starts a handshake as the dialing side, toward `remote_static_public`.
    pub fn new_initiator(static_secret_key: SecretKey, remote_static_public: PublicKey) -> Self {
        Self::new(Role::Initiator, static_secret_key, Some(remote_static_public))
    }

    /// Starts a handshake as the accepting side; the remote's static key is
    /// not known until Auth is parsed.
    pub fn new_recipient(static_secret_key: SecretKey) -> Self {
        Self::new(Role::Recipient, static_secret_key, None)
    }

    fn new(
        role: Role,
        static_secret_key: SecretKey,
        remote_static_public: Option<PublicKey>,
    ) -> Self {
        Self {
            role,
            state: HandshakeState::Auth,
            static_secret_key,
            remote_static_public,
            ephemeral_secret_key: SecretKey::new(&mut rand::thread_rng()),
            remote_ephemeral_public: None,
            nonce: rand::thread_rng().gen(),
            remote_nonce: None,
            init_msg: None,
            remote_init_msg: None,
            ack_msg: None,
            remote_ack_msg: None,
            ingress_mac: None,
            egress_mac: None,
            ingress_aes: None,
            egress_aes: None,
            next_body_size: None,
        }
    }

    /// The current handshake/framing state.
    pub const fn state(&self) -> HandshakeState {
        self.state
    }

    /// Which side of the handshake this state machine plays.
    pub const fn role(&self) -> Role {
        self.role
    }

    fn static_shared_secret(&self) -> Result<[u8; 32]> {
        let remote = self
            .remote_static_public
            .ok_or(ECIESError::UnexpectedState)?;
        Ok(raw_shared_secret(&remote, &self.static_secret_key))
    }

    fn uncompressed_no_prefix(public: &PublicKey) -> [u8; 64] {
        let full = public.serialize_uncompressed();
        let mut out = [0u8; 64];
        out.copy_from_slice(&full[1..]);
        out
    }

    // ---- Auth ----------------------------------------------------------

    /// `createAuth{EIP8}`: produces the modern, length-prefixed, RLP-bodied
    /// Auth message. Only valid for the initiator in state [`HandshakeState::Auth`].
    pub fn create_auth_eip8(&mut self) -> Result<Vec<u8>> {
        if self.role != Role::Initiator || self.state != HandshakeState::Auth {
            return Err(ECIESError::UnexpectedState);
        }

        let shared = self.static_shared_secret()?;
        let mut msg = [0u8; 32];
        for i in 0..32 {
            msg[i] = shared[i] ^ self.nonce[i];
        }
        let message = secp256k1::Message::from_digest(msg);
        let (recovery_id, sig) = SECP256K1
            .sign_ecdsa_recoverable(&message, &self.ephemeral_secret_key)
            .serialize_compact();
        let mut signature = Vec::with_capacity(65);
        signature.extend_from_slice(&sig);
        signature.push(recovery_id.to_i32() as u8);

        let initiator_public = PublicKey::from_secret_key(SECP256K1, &self.static_secret_key);
        let body = AuthBody {
            signature,
            initiator_pubkey: Self::uncompressed_no_prefix(&initiator_public).to_vec(),
            nonce: self.nonce.to_vec(),
            auth_vsn: 4,
        };

        let mut plaintext = Vec::new();
        body.encode(&mut plaintext);
        // EIP-8 recommends padding the body with random junk so the message
        // length doesn't leak the exact field layout.
        let padding_len = rand::thread_rng().gen_range(100..=300);
        plaintext.extend(std::iter::repeat_with(|| rand::thread_rng().gen::<u8>()).take(padding_len));

        let overhead = 65 + 16 + 32; // ephemeral pubkey + iv + hmac tag
        let total_len = (overhead + plaintext.len()) as u16;
        let size_prefix = total_len.to_be_bytes();

        let remote = self.remote_static_public.ok_or(ECIESError::UnexpectedState)?;
        let encrypted = encrypt_message(&remote, &plaintext, &size_prefix)?;

        let mut framed = Vec::with_capacity(2 + encrypted.len());
        framed.extend_from_slice(&size_prefix);
        framed.extend_from_slice(&encrypted);

        self.init_msg = Some(framed.clone());
        self.state = HandshakeState::Ack;
        trace!(target: "net::ecies", len = framed.len(), "sent EIP-8 auth");
        Ok(framed)
    }

    /// `createAuth{NonEIP8}`: the legacy fixed-layout Auth, retained for
    /// compatibility with pre-EIP-8 peers.
    pub fn create_auth_non_eip8(&mut self) -> Result<Vec<u8>> {
        if self.role != Role::Initiator || self.state != HandshakeState::Auth {
            return Err(ECIESError::UnexpectedState);
        }

        let shared = self.static_shared_secret()?;
        let mut msg = [0u8; 32];
        for i in 0..32 {
            msg[i] = shared[i] ^ self.nonce[i];
        }
        let message = secp256k1::Message::from_digest(msg);
        let (recovery_id, sig) = SECP256K1
            .sign_ecdsa_recoverable(&message, &self.ephemeral_secret_key)
            .serialize_compact();

        let ephemeral_public = PublicKey::from_secret_key(SECP256K1, &self.ephemeral_secret_key);
        let static_public = PublicKey::from_secret_key(SECP256K1, &self.static_secret_key);

        let mut plaintext = Vec::with_capacity(65 + 32 + 64 + 32 + 1);
        plaintext.extend_from_slice(&sig);
        plaintext.push(recovery_id.to_i32() as u8);
        plaintext.extend_from_slice(
            Keccak256::digest(Self::uncompressed_no_prefix(&ephemeral_public)).as_slice(),
        );
        plaintext.extend_from_slice(&Self::uncompressed_no_prefix(&static_public));
        plaintext.extend_from_slice(&self.nonce);
        plaintext.push(0x00); // token-flag, unused

        let remote = self.remote_static_public.ok_or(ECIESError::UnexpectedState)?;
        let encrypted = encrypt_message(&remote, &plaintext, &[])?;

        self.init_msg = Some(encrypted.clone());
        self.state = HandshakeState::Ack;
        Ok(encrypted)
    }

    /// Detects and parses an Auth message off the wire, dispatching to the
    /// EIP-8 or legacy layout by inspecting the leading byte, per `spec.md`
    /// §4.A's detection rule.
    pub fn parse_auth(&mut self, data: &[u8]) -> Result<()> {
        if data.first() == Some(&0x04) {
            self.parse_auth_plain(data)
        } else {
            self.parse_auth_eip8(data)
        }
    }

    /// `parseAuth{EIP8}`.
    pub fn parse_auth_eip8(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < 2 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 2,
                actual: data.len(),
            });
        }
        let size_prefix = &data[..2];
        let body_ciphertext = &data[2..];
        let plaintext = decrypt_message(&self.static_secret_key, body_ciphertext, size_prefix)?;
        let mut body_slice = plaintext.as_slice();
        let body = AuthBody::decode(&mut body_slice)?;

        self.apply_auth_body(&body)?;
        self.remote_init_msg = Some(data.to_vec());
        self.state = HandshakeState::Ack;
        Ok(())
    }

    /// `parseAuth{Plain}`, the legacy fixed layout.
    pub fn parse_auth_plain(&mut self, data: &[u8]) -> Result<()> {
        let plaintext = decrypt_message(&self.static_secret_key, data, &[])?;
        if plaintext.len() < 65 + 32 + 64 + 32 + 1 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 65 + 32 + 64 + 32 + 1,
                actual: plaintext.len(),
            });
        }
        let signature = plaintext[0..65].to_vec();
        // bytes [65..97) are keccak256(ephemeral pubkey), recomputed below
        // rather than trusted, so they are only used for bookkeeping.
        let initiator_pubkey = plaintext[97..161].to_vec();
        let nonce = plaintext[161..193].to_vec();

        let body = AuthBody {
            signature,
            initiator_pubkey,
            nonce,
            auth_vsn: 0,
        };
        self.apply_auth_body(&body)?;
        self.remote_init_msg = Some(data.to_vec());
        self.state = HandshakeState::Ack;
        Ok(())
    }

    fn apply_auth_body(&mut self, body: &AuthBody) -> Result<()> {
        if body.initiator_pubkey.len() != 64 || body.nonce.len() != 32 || body.signature.len() != 65 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 64 + 32 + 65,
                actual: body.initiator_pubkey.len() + body.nonce.len() + body.signature.len(),
            });
        }

        let mut prefixed = [0u8; 65];
        prefixed[0] = 0x04;
        prefixed[1..].copy_from_slice(&body.initiator_pubkey);
        let initiator_public = PublicKey::from_slice(&prefixed)?;
        self.remote_static_public = Some(initiator_public);

        let mut remote_nonce = [0u8; 32];
        remote_nonce.copy_from_slice(&body.nonce);
        self.remote_nonce = Some(remote_nonce);

        let shared = self.static_shared_secret()?;
        let mut msg = [0u8; 32];
        for i in 0..32 {
            msg[i] = shared[i] ^ remote_nonce[i];
        }
        let recovery_id = secp256k1::ecdsa::RecoveryId::from_i32(i32::from(body.signature[64]))
            .map_err(|_| ECIESError::TagCheckFailed)?;
        let sig = secp256k1::ecdsa::RecoverableSignature::from_compact(
            &body.signature[..64],
            recovery_id,
        )?;
        let message = secp256k1::Message::from_digest(msg);
        let remote_ephemeral = SECP256K1.recover_ecdsa(&message, &sig)?;
        self.remote_ephemeral_public = Some(remote_ephemeral);
        Ok(())
    }

    // ---- Ack -------------------------------------------------------------

    /// `createAck{EIP8}`: the recipient's response, after parsing Auth. This
    /// is also where the shared framing secrets are derived, since they need
    /// both sides' ephemeral keys and nonces.
    pub fn create_ack_eip8(&mut self) -> Result<Vec<u8>> {
        if self.role != Role::Recipient || self.state != HandshakeState::Ack {
            return Err(ECIESError::UnexpectedState);
        }
        let ephemeral_public = PublicKey::from_secret_key(SECP256K1, &self.ephemeral_secret_key);
        let body = AckBody {
            ephemeral_pubkey: Self::uncompressed_no_prefix(&ephemeral_public).to_vec(),
            nonce: self.nonce.to_vec(),
            ack_vsn: 4,
        };
        let mut plaintext = Vec::new();
        body.encode(&mut plaintext);
        let padding_len = rand::thread_rng().gen_range(100..=300);
        plaintext.extend(std::iter::repeat_with(|| rand::thread_rng().gen::<u8>()).take(padding_len));

        let overhead = 65 + 16 + 32;
        let total_len = (overhead + plaintext.len()) as u16;
        let size_prefix = total_len.to_be_bytes();

        let remote = self.remote_static_public.ok_or(ECIESError::UnexpectedState)?;
        let encrypted = encrypt_message(&remote, &plaintext, &size_prefix)?;
        let mut framed = Vec::with_capacity(2 + encrypted.len());
        framed.extend_from_slice(&size_prefix);
        framed.extend_from_slice(&encrypted);

        self.ack_msg = Some(framed.clone());
        self.derive_secrets()?;
        self.state = HandshakeState::Header;
        Ok(framed)
    }

    /// `createAck{NonEIP8}`, the legacy fixed layout.
    pub fn create_ack_non_eip8(&mut self) -> Result<Vec<u8>> {
        if self.role != Role::Recipient || self.state != HandshakeState::Ack {
            return Err(ECIESError::UnexpectedState);
        }
        let ephemeral_public = PublicKey::from_secret_key(SECP256K1, &self.ephemeral_secret_key);
        let mut plaintext = Vec::with_capacity(64 + 32 + 1);
        plaintext.extend_from_slice(&Self::uncompressed_no_prefix(&ephemeral_public));
        plaintext.extend_from_slice(&self.nonce);
        plaintext.push(0x00);

        let remote = self.remote_static_public.ok_or(ECIESError::UnexpectedState)?;
        let encrypted = encrypt_message(&remote, &plaintext, &[])?;

        self.ack_msg = Some(encrypted.clone());
        self.derive_secrets()?;
        self.state = HandshakeState::Header;
        Ok(encrypted)
    }

    /// Detects and parses an Ack message, dispatching by the same leading
    /// byte heuristic as [`Self::parse_auth`].
    pub fn parse_ack(&mut self, data: &[u8]) -> Result<()> {
        if data.first() == Some(&0x04) {
            self.parse_ack_plain(data)
        } else {
            self.parse_ack_eip8(data)
        }
    }

    /// `parseAck{EIP8}`.
    pub fn parse_ack_eip8(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < 2 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 2,
                actual: data.len(),
            });
        }
        let size_prefix = &data[..2];
        let body_ciphertext = &data[2..];
        let plaintext = decrypt_message(&self.static_secret_key, body_ciphertext, size_prefix)?;
        let mut body_slice = plaintext.as_slice();
        let body = AckBody::decode(&mut body_slice)?;
        self.apply_ack_body(&body)?;
        self.remote_ack_msg = Some(data.to_vec());
        self.derive_secrets()?;
        self.state = HandshakeState::Header;
        Ok(())
    }

    /// `parseAck{Plain}`.
    pub fn parse_ack_plain(&mut self, data: &[u8]) -> Result<()> {
        let plaintext = decrypt_message(&self.static_secret_key, data, &[])?;
        if plaintext.len() < 64 + 32 + 1 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 64 + 32 + 1,
                actual: plaintext.len(),
            });
        }
        let body = AckBody {
            ephemeral_pubkey: plaintext[0..64].to_vec(),
            nonce: plaintext[64..96].to_vec(),
            ack_vsn: 0,
        };
        self.apply_ack_body(&body)?;
        self.remote_ack_msg = Some(data.to_vec());
        self.derive_secrets()?;
        self.state = HandshakeState::Header;
        Ok(())
    }

    fn apply_ack_body(&mut self, body: &AckBody) -> Result<()> {
        if body.ephemeral_pubkey.len() != 64 || body.nonce.len() != 32 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 96,
                actual: body.ephemeral_pubkey.len() + body.nonce.len(),
            });
        }
        let mut prefixed = [0u8; 65];
        prefixed[0] = 0x04;
        prefixed[1..].copy_from_slice(&body.ephemeral_pubkey);
        self.remote_ephemeral_public = Some(PublicKey::from_slice(&prefixed)?);

        let mut remote_nonce = [0u8; 32];
        remote_nonce.copy_from_slice(&body.nonce);
        self.remote_nonce = Some(remote_nonce);
        Ok(())
    }

    /// Derives the AES and MAC secrets from both ephemeral keys and nonces,
    /// per the RLPx handshake's key-derivation schedule, and primes the
    /// ingress/egress cipher and MAC states.
    fn derive_secrets(&mut self) -> Result<()> {
        let remote_ephemeral = self
            .remote_ephemeral_public
            .ok_or(ECIESError::UnexpectedState)?;
        let remote_nonce = self.remote_nonce.ok_or(ECIESError::UnexpectedState)?;
        let ephemeral_shared = raw_shared_secret(&remote_ephemeral, &self.ephemeral_secret_key);

        let (initiator_nonce, recipient_nonce) = match self.role {
            Role::Initiator => (self.nonce, remote_nonce),
            Role::Recipient => (remote_nonce, self.nonce),
        };

        let nonce_hash: [u8; 32] = {
            let mut hasher = Keccak256::new();
            hasher.update(recipient_nonce);
            hasher.update(initiator_nonce);
            hasher.finalize().into()
        };
        let shared_secret: [u8; 32] = {
            let mut hasher = Keccak256::new();
            hasher.update(ephemeral_shared);
            hasher.update(nonce_hash);
            hasher.finalize().into()
        };
        let aes_secret: [u8; 32] = {
            let mut hasher = Keccak256::new();
            hasher.update(ephemeral_shared);
            hasher.update(shared_secret);
            hasher.finalize().into()
        };
        let mac_secret: [u8; 32] = {
            let mut hasher = Keccak256::new();
            hasher.update(ephemeral_shared);
            hasher.update(aes_secret);
            hasher.finalize().into()
        };

        let auth = self
            .init_msg
            .clone()
            .or_else(|| self.remote_init_msg.clone())
            .ok_or(ECIESError::UnexpectedState)?;
        let ack = self
            .ack_msg
            .clone()
            .or_else(|| self.remote_ack_msg.clone())
            .ok_or(ECIESError::UnexpectedState)?;

        let mut egress_seed = [0u8; 32];
        let mut ingress_seed = [0u8; 32];
        for i in 0..32 {
            egress_seed[i] = mac_secret[i] ^ recipient_nonce[i];
            ingress_seed[i] = mac_secret[i] ^ initiator_nonce[i];
        }

        let (mut egress_mac, mut ingress_mac) = (Mac::new(mac_secret), Mac::new(mac_secret));
        match self.role {
            Role::Initiator => {
                egress_mac.update(&egress_seed);
                egress_mac.update(&auth);
                ingress_mac.update(&ingress_seed);
                ingress_mac.update(&ack);
            }
            Role::Recipient => {
                egress_mac.update(&ingress_seed);
                egress_mac.update(&ack);
                ingress_mac.update(&egress_seed);
                ingress_mac.update(&auth);
            }
        }

        self.egress_mac = Some(egress_mac);
        self.ingress_mac = Some(ingress_mac);
        self.egress_aes = Some(Aes256Ctr64BE::new((&aes_secret).into(), &[0u8; 16].into()));
        self.ingress_aes = Some(Aes256Ctr64BE::new((&aes_secret).into(), &[0u8; 16].into()));
        trace!(target: "net::ecies", role = ?self.role, "derived RLPx frame secrets");
        Ok(())
    }

    // ---- Framing -----------------------------------------------------

    /// `createHeader(bodyLen) -> 32 bytes`: a 16-byte encrypted header plus
    /// its 16-byte MAC.
    pub fn create_header(&mut self, body_len: usize) -> Result<[u8; 32]> {
        let aes = self.egress_aes.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let mac = self.egress_mac.as_mut().ok_or(ECIESError::UnexpectedState)?;

        let mut header = [0u8; 16];
        let len_bytes = (body_len as u32).to_be_bytes();
        header[0..3].copy_from_slice(&len_bytes[1..]);
        // header-data: [0xc2, 0x80, 0x80] (an empty RLP 2-list), matching
        // every real RLPx implementation's placeholder capability-id/context.
        header[3..6].copy_from_slice(&[0xc2, 0x80, 0x80]);

        aes.apply_keystream(&mut header);
        let tag = mac.header_mac(&header);

        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&header);
        out[16..].copy_from_slice(&tag);
        Ok(out)
    }

    /// `parseHeader(bytes) -> bodyLen`, failing on MAC mismatch.
    pub fn parse_header(&mut self, data: &[u8; 32]) -> Result<usize> {
        let (header_ciphertext, tag) = (
            <[u8; 16]>::try_from(&data[..16]).expect("slice is 16 bytes"),
            &data[16..],
        );
        let mac = self.ingress_mac.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let expected = mac.header_mac(&header_ciphertext);
        if expected != tag {
            return Err(ECIESError::TagCheckFailed);
        }

        let aes = self.ingress_aes.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let mut header = header_ciphertext;
        aes.apply_keystream(&mut header);

        let body_len = u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
        self.next_body_size = Some(body_len);
        Ok(body_len)
    }

    /// `createBody(frame) -> bytes`: pads `frame` to a 16-byte multiple and
    /// appends the body MAC.
    pub fn create_body(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        let aes = self.egress_aes.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let mac = self.egress_mac.as_mut().ok_or(ECIESError::UnexpectedState)?;

        let padded_len = frame.len().div_ceil(16) * 16;
        let mut body = vec![0u8; padded_len];
        body[..frame.len()].copy_from_slice(frame);

        aes.apply_keystream(&mut body);
        let tag = mac.body_mac(&body);

        body.extend_from_slice(&tag);
        Ok(body)
    }

    /// `parseBody(bytes) -> frame`, trimming the body back to the length
    /// reported by the most recent [`Self::parse_header`] call.
    pub fn parse_body(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let body_len = self
            .next_body_size
            .take()
            .ok_or(ECIESError::UnexpectedState)?;
        if data.len() < 16 {
            return Err(ECIESError::InvalidMessageLength {
                expected: 16,
                actual: data.len(),
            });
        }
        let (ciphertext, tag) = data.split_at(data.len() - 16);

        let mac = self.ingress_mac.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let expected = mac.body_mac(ciphertext);
        if expected != tag {
            return Err(ECIESError::TagCheckFailed);
        }

        let aes = self.ingress_aes.as_mut().ok_or(ECIESError::UnexpectedState)?;
        let mut plaintext = ciphertext.to_vec();
        aes.apply_keystream(&mut plaintext);
        plaintext.truncate(body_len);
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair() -> (SecretKey, PublicKey) {
        let secret = SecretKey::new(&mut rand::thread_rng());
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        (secret, public)
    }

    #[test]
    fn full_handshake_then_one_frame_round_trips() {
        let (initiator_secret, initiator_public) = key_pair();
        let (recipient_secret, recipient_public) = key_pair();

        let mut initiator = EciesState::new_initiator(initiator_secret, recipient_public);
        let mut recipient = EciesState::new_recipient(recipient_secret);

        let auth = initiator.create_auth_eip8().unwrap();
        recipient.parse_auth(&auth).unwrap();
        // the recipient now knows the initiator's static key from Auth.
        recipient.remote_static_public = Some(initiator_public);

        let ack = recipient.create_ack_eip8().unwrap();
        initiator.parse_ack(&ack).unwrap();

        assert_eq!(initiator.state(), HandshakeState::Header);
        assert_eq!(recipient.state(), HandshakeState::Header);

        let frame = b"hello from the initiator";
        let header_bytes = initiator.create_header(frame.len()).unwrap();
        let body_len = recipient.parse_header(&header_bytes).unwrap();
        assert_eq!(body_len, frame.len());

        let body_bytes = initiator.create_body(frame).unwrap();
        let decoded = recipient.parse_body(&body_bytes).unwrap();
        assert_eq!(decoded, frame);
    }
}
