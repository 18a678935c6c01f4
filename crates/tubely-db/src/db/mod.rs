//! Database repositories for the data access layer
//
// Repository trait shared by every backend
mod repository;
//
// PostgreSQL repository
pub mod video;
//
// In-process repository
pub mod memory;

pub use memory::InMemoryVideoRepository;
pub use repository::VideoRepository;
pub use video::PgVideoRepository;
