//! # TH-03 Viewing-Key Registry
//!
//! Durable map from account id to the viewing key that recognizes its notes.
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Registration rules
//!
//! | Existing entry | Same key | Different key |
//! |----------------|----------|---------------|
//! | none | `Created` | `Created` |
//! | present | `AlreadyRegistered` | `Conflict` |
//!
//! Keys are compared in constant time and never appear in logs.
//! Entries are written through to a `KeyValueStore` so a restarted node
//! reloads them with [`KeyRegistry::load`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{RegistrationOutcome, RegistryError};
pub use ports::ViewingKeyRegistry;
pub use service::KeyRegistry;
