//! # Adapters Layer
//!
//! Reference implementation of the `OwnershipTest` port.

mod trial_decryption;

pub use trial_decryption::TrialDecryption;
