//! Adapters for the query service.

pub mod ed25519;

pub use ed25519::Ed25519RequestVerifier;
