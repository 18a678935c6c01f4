//! Tubely API Library
//!
//! This crate provides the HTTP handlers, the bearer-token extractor and application setup
//! for the video upload service.

pub mod auth;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
