//! Integration flows.

pub mod durability;
pub mod flows;
