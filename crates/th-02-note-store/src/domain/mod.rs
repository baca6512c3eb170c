//! # Domain Module

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::*;
pub use errors::*;
