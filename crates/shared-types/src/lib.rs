//! # Shared Types Crate
//!
//! The ledger data model used by every Tahini subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: note records, blocks and ownership records
//!   are defined once, here.
//! - **No Owner Field**: a `NoteRecord` carries no owner. Ownership is only
//!   ever established by the synchronizer's ownership test.
//! - **Secret Hygiene**: `ViewingKey` is zeroized on drop, compared in
//!   constant time and never printed.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
