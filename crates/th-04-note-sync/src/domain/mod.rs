//! # Domain Module
//!
//! Scan reports and error types for the synchronizer.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
