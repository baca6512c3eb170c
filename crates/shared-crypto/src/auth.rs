//! # Request Authentication
//!
//! Ed25519 over a digest that binds the account id to the caller's message.
//! The signing seed is derived from the information key, so the verifier
//! needs nothing beyond what registration already stored.

use crate::hashing::{blake3_derive_key, blake3_hash_many, Hash};
use crate::CryptoError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// KDF context for the request-signing seed.
pub const AUTH_KEY_CONTEXT: &str = "tahini 2024-01-01 request signing key v1";

/// Domain separator for the signed digest.
const REQUEST_DOMAIN: &[u8] = b"tahini/get-notes/v1";

/// Length of an encoded request signature.
pub const SIGNATURE_LEN: usize = 64;

/// Digest a note query signs.
pub fn request_digest(account_id: &[u8; 32], message: &[u8]) -> Hash {
    blake3_hash_many(&[REQUEST_DOMAIN, account_id, message])
}

/// Signs note queries for one information key. The seed is wiped on drop.
pub struct RequestSigner {
    signing_key: SigningKey,
}

impl RequestSigner {
    /// Derive the signer for `information_key`.
    pub fn derive(information_key: &[u8]) -> Result<Self, CryptoError> {
        if information_key.is_empty() {
            return Err(CryptoError::EmptyKey);
        }
        let seed = blake3_derive_key(AUTH_KEY_CONTEXT, information_key);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Public half, as the verifier reconstructs it.
    pub fn verifying_key(&self) -> RequestVerifyingKey {
        RequestVerifyingKey(self.signing_key.verifying_key())
    }

    /// Sign a query for `account_id`.
    pub fn sign(&self, account_id: &[u8; 32], message: &[u8]) -> RequestSignature {
        let digest = request_digest(account_id, message);
        RequestSignature(self.signing_key.sign(&digest).to_bytes())
    }
}

/// Checks query signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestVerifyingKey(VerifyingKey);

impl RequestVerifyingKey {
    /// Encoded public key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Verify `signature` over the digest of (`account_id`, `message`).
    pub fn verify(
        &self,
        account_id: &[u8; 32],
        message: &[u8],
        signature: &RequestSignature,
    ) -> Result<(), CryptoError> {
        let digest = request_digest(account_id, message);
        self.0
            .verify_strict(&digest, &Signature::from_bytes(&signature.0))
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// A 64-byte Ed25519 query signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestSignature([u8; SIGNATURE_LEN]);

impl RequestSignature {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a signature received from a caller.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        <[u8; SIGNATURE_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignatureFormat {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            })
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_is_deterministic_per_key() {
        let a = RequestSigner::derive(b"key").unwrap();
        let b = RequestSigner::derive(b"key").unwrap();
        assert_eq!(a.verifying_key(), b.verifying_key());
        assert_eq!(a.sign(&[1; 32], b"m"), b.sign(&[1; 32], b"m"));
        assert_ne!(
            a.verifying_key(),
            RequestSigner::derive(b"other").unwrap().verifying_key()
        );
    }

    #[test]
    fn test_digest_binds_account() {
        assert_ne!(request_digest(&[1; 32], b"m"), request_digest(&[2; 32], b"m"));
    }

    #[test]
    fn test_signature_from_slice_length() {
        assert!(RequestSignature::from_slice(&[0u8; 64]).is_ok());
        assert_eq!(
            RequestSignature::from_slice(&[0u8; 3]),
            Err(CryptoError::InvalidSignatureFormat {
                expected: 64,
                actual: 3
            })
        );
    }
}
