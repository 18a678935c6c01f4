//! Tubely Database Layer
//!
//! Persistence for video records behind the [`VideoRepository`] trait, with a
//! PostgreSQL implementation and an in-memory one for tests and local runs.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
