//! # Note Capabilities
//!
//! Byte-level entry points used by the adapters: seal and trial-decrypt
//! notes, derive commitments, sign and verify note queries.

use crate::auth::{RequestSignature, RequestSigner};
use crate::hashing::{blake3_hash, Hash};
use crate::sealing::NoteCipher;
use crate::CryptoError;

/// Encrypt `plaintext` so that only holders of `information_key` can open it.
pub fn seal_note(information_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    NoteCipher::derive(information_key)?.seal(plaintext)
}

/// Trial-decrypt a sealed note.
///
/// - `Ok(Some(plaintext))`: the note is sealed to this key
/// - `Ok(None)`: well-formed, but sealed to someone else
/// - `Err(MalformedNote)`: too short to be a sealed note at all
pub fn open_note(information_key: &[u8], sealed: &[u8]) -> Result<Option<Vec<u8>>, CryptoError> {
    NoteCipher::derive(information_key)?.open(sealed)
}

/// Commitment identifier for a sealed note.
pub fn note_commitment(sealed: &[u8]) -> Hash {
    blake3_hash(sealed)
}

/// Sign a note query on behalf of `account_id`.
pub fn sign_request(
    information_key: &[u8],
    account_id: &[u8; 32],
    message: &[u8],
) -> Result<RequestSignature, CryptoError> {
    Ok(RequestSigner::derive(information_key)?.sign(account_id, message))
}

/// Verify a note query signature against the account's information key.
pub fn verify_request(
    information_key: &[u8],
    account_id: &[u8; 32],
    message: &[u8],
    signature: &RequestSignature,
) -> Result<(), CryptoError> {
    RequestSigner::derive(information_key)?
        .verifying_key()
        .verify(account_id, message, signature)
}
