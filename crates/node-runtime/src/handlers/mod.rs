//! # Background Handlers

pub mod follower;

pub use follower::LedgerFollower;
