//! Domain layer for the query service.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
