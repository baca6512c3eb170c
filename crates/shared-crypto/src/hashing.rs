//! # BLAKE3 Hashing
//!
//! Commitments and key derivation.

/// 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Digest of one contiguous input.
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Digest of `inputs` fed back to back, equal to hashing their concatenation.
pub fn blake3_hash_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    *hasher.finalize().as_bytes()
}

/// BLAKE3 `derive_key` mode. The sealing and request-auth keys both come
/// from one information key, separated only by `context`.
pub fn blake3_derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    *hasher.finalize().as_bytes()
}
