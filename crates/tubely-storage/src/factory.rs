use crate::traits::{StorageError, StorageResult};
use crate::AssetStore;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use std::sync::Arc;
use tubely_core::Config;

/// Create the S3 client from configuration
#[cfg(feature = "storage-s3")]
pub async fn create_object_store(config: &Config) -> StorageResult<Arc<S3Storage>> {
    let region = config.s3_region().map(String::from).ok_or_else(|| {
        StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
    })?;
    let endpoint = config.s3_endpoint().map(String::from);

    let storage = S3Storage::new(region, endpoint).await?;
    Ok(Arc::new(storage))
}

/// Create the thumbnail asset directory from configuration
pub async fn create_asset_store(config: &Config) -> StorageResult<Arc<AssetStore>> {
    if config.assets_base_url().is_empty() {
        return Err(StorageError::ConfigError(
            "ASSETS_BASE_URL not configured".to_string(),
        ));
    }
    let store = AssetStore::new(config.assets_root().clone(), config.assets_base_url()).await?;
    Ok(Arc::new(store))
}
