//! Ports layer for the query service.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
