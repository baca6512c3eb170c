//! # Tahini Test Suite
//!
//! Cross-subsystem flows that exercise the ledger, store, registry,
//! synchronizer and query service together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs       # Registration, matching and query scenarios
//!     └── durability.rs  # Restart against file-backed stores
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p th-tests
//! cargo test -p th-tests integration::flows::
//! ```

pub mod integration;
