//! # API Types
//!
//! Request and response shapes of the registration and query endpoints.
//! Field names serialize in camelCase.

pub mod dto;
pub mod errors;

pub use dto::{ApiResponse, GetNotesRequest, NoteView, RegisterAccountRequest};
pub use errors::ApiError;
