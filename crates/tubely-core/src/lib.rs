//! Tubely Core Library
//!
//! This crate provides the domain models, error types, configuration and content-type
//! helpers shared by every Tubely component.

pub mod config;
pub mod error;
pub mod media_type;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, TubelyConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use media_type::DeclaredMediaType;
