//! # Shared Crypto - Reference Capabilities
//!
//! The synchronizer treats note ownership and request authentication as
//! pluggable capabilities. This crate supplies the reference construction
//! the default adapters are built on.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Note commitments, key derivation |
//! | `sealing` | XChaCha20-Poly1305 | Note encryption, trial decryption |
//! | `auth` | Ed25519 | Query request signatures |
//! | `notes` | all of the above | Byte-level entry points for adapters |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod errors;
pub mod hashing;
pub mod notes;
pub mod sealing;

// Re-exports
pub use auth::{request_digest, RequestSignature, RequestSigner, RequestVerifyingKey, SIGNATURE_LEN};
pub use errors::CryptoError;
pub use hashing::{blake3_derive_key, blake3_hash, blake3_hash_many};
pub use notes::{note_commitment, open_note, seal_note, sign_request, verify_request};
pub use sealing::{NoteCipher, MIN_SEALED_LEN};
