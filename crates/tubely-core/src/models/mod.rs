//! Data models for the application
//!
//! Video records, their stored object references and the orientation classes used
//! to lay out object keys.

mod orientation;
mod video;

pub use orientation::*;
pub use video::*;
