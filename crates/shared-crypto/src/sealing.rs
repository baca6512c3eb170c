//! # Note Sealing
//!
//! XChaCha20-Poly1305 under a key derived from the account's information
//! key. A wrong key fails authentication, which is what lets trial
//! decryption serve as an ownership test.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ nonce (24 B) │ ciphertext ‖ Poly1305 (16 B) │
//! └──────────────┴──────────────────────────────┘
//! ```

use crate::hashing::blake3_derive_key;
use crate::CryptoError;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// KDF context for the note encryption key.
pub const NOTE_KEY_CONTEXT: &str = "tahini 2024-01-01 note encryption key v1";

/// Random nonce prefix.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Shortest byte string that can be a sealed note.
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Seals and opens notes for one information key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct NoteCipher {
    key: [u8; 32],
}

impl NoteCipher {
    /// Derive the note key for `information_key`.
    pub fn derive(information_key: &[u8]) -> Result<Self, CryptoError> {
        if information_key.is_empty() {
            return Err(CryptoError::EmptyKey);
        }
        Ok(Self {
            key: blake3_derive_key(NOTE_KEY_CONTEXT, information_key),
        })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .aead()
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a sealed note.
    ///
    /// `Ok(None)` when the note authenticates under some other key;
    /// `MalformedNote` when it is too short to be sealed at all.
    pub fn open(&self, sealed: &[u8]) -> Result<Option<Vec<u8>>, CryptoError> {
        if sealed.len() < MIN_SEALED_LEN {
            return Err(CryptoError::MalformedNote {
                minimum: MIN_SEALED_LEN,
                actual: sealed.len(),
            });
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        Ok(self.aead().decrypt(XNonce::from_slice(nonce), ciphertext).ok())
    }

    fn aead(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.key).into())
    }
}
