//! Tubely Storage Library
//!
//! Content-store access for the upload pipeline: streaming finished files to S3,
//! signing read links, and keeping thumbnail assets on local disk.
//!
//! # Key format
//!
//! Video objects are stored under `{orientation}/{token}.{extension}` where the
//! orientation is `landscape`, `portrait` or `other`. Thumbnail assets are flat
//! `{token}.{extension}` files. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
pub mod resolver;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod stream;
pub mod traits;

// Re-export commonly used types
pub use factory::create_asset_store;
#[cfg(feature = "storage-s3")]
pub use factory::create_object_store;
pub use local::{AssetStore, StoredAsset};
pub use resolver::ReferenceResolver;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use stream::write_limited;
pub use traits::{ObjectUploader, StorageError, StorageResult, UrlSigner};
