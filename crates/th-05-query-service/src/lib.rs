//! # TH-05 Query Service
//!
//! Authenticates a caller's request to read an account's notes and returns
//! the account's ownership records in arrival order.
//!
//! **Subsystem ID:** 5  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Outcomes
//!
//! | Account | Signature | Result |
//! |---------|-----------|--------|
//! | unknown | any | `Unauthorized` |
//! | registered | invalid | `Unauthorized` |
//! | registered | valid | `Ok(records)`, possibly empty |
//!
//! An unknown account and a bad signature are indistinguishable to the
//! caller, so the endpoint does not reveal who is registered.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::Ed25519RequestVerifier;
pub use domain::{NotesQuery, QueryError};
pub use ports::{NoteQueryApi, RequestVerifier};
pub use service::QueryService;
