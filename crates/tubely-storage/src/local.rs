use crate::keys::asset_file_name;
use crate::stream::write_limited;
use crate::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// A thumbnail written to the asset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub file_name: String,
    pub url: String,
}

/// Local directory of static thumbnail assets, served under `/assets`.
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
    base_url: String,
}

impl AssetStore {
    /// Create a new AssetStore instance
    ///
    /// # Arguments
    /// * `root` - Directory the assets are written to (e.g., "./assets")
    /// * `base_url` - Public origin of the service (e.g., "http://localhost:8091");
    ///   asset URLs are `{base_url}/assets/{file}`
    pub async fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create asset directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(AssetStore {
            root,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Public URL for an asset file name
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/assets/{}", self.base_url, file_name)
    }

    /// File name of an asset URL issued by this store, if it is one.
    pub fn file_name_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = format!("{}/assets/", self.base_url);
        url.strip_prefix(prefix.as_str())
            .filter(|name| self.name_to_path(name).is_ok())
    }

    /// Resolve a file name inside the asset root.
    ///
    /// Names are flat: anything with a path separator or a parent reference is rejected.
    fn name_to_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Asset name contains invalid characters".to_string(),
            ));
        }
        Ok(self.root.join(file_name))
    }

    /// Stream `reader` into a new randomly named asset with the given extension.
    ///
    /// Nothing is left on disk when this fails.
    pub async fn store<R>(
        &self,
        reader: &mut R,
        extension: &str,
        max_bytes: u64,
    ) -> StorageResult<StoredAsset>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let file_name = asset_file_name(extension);
        let path = self.name_to_path(&file_name)?;
        let start = std::time::Instant::now();

        let written = match write_limited(reader, &path, max_bytes).await {
            Ok(0) => {
                discard(&path).await;
                return Err(StorageError::EmptyContent);
            }
            Ok(n) => n,
            Err(e) => {
                discard(&path).await;
                return Err(e);
            }
        };

        tracing::info!(
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Asset stored"
        );

        Ok(StoredAsset {
            url: self.url_for(&file_name),
            file_name,
        })
    }

    /// Delete an asset. A missing file is not an error.
    pub async fn remove(&self, file_name: &str) -> StorageResult<()> {
        let path = self.name_to_path(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove partial asset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store_in(dir: &TempDir) -> AssetStore {
        AssetStore::new(dir.path(), "http://localhost:8091/")
            .await
            .unwrap()
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_store_writes_file_and_builds_url() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        let mut body: &[u8] = b"\x89PNG fake";

        let asset = store.store(&mut body, "png", 1024).await.unwrap();
        assert!(asset.file_name.ends_with(".png"));
        assert_eq!(
            asset.url,
            format!("http://localhost:8091/assets/{}", asset.file_name)
        );
        let saved = tokio::fs::read(dir.path().join(&asset.file_name))
            .await
            .unwrap();
        assert_eq!(saved, b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_oversized_asset_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        let data = vec![0u8; 2048];
        let mut body: &[u8] = &data;

        let err = store.store(&mut body, "jpeg", 100).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_asset_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        let mut body: &[u8] = b"";

        assert!(matches!(
            store.store(&mut body, "png", 100).await,
            Err(StorageError::EmptyContent)
        ));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_remove_deletes_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        let mut body: &[u8] = b"jpeg";
        let asset = store.store(&mut body, "jpeg", 100).await.unwrap();

        store.remove(&asset.file_name).await.unwrap();
        assert_eq!(file_count(dir.path()), 0);
        store.remove(&asset.file_name).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_name_from_url() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        assert_eq!(
            store.file_name_from_url("http://localhost:8091/assets/abc.png"),
            Some("abc.png")
        );
        assert_eq!(
            store.file_name_from_url("https://cdn.example.com/assets/abc.png"),
            None
        );
        assert_eq!(
            store.file_name_from_url("http://localhost:8091/assets/../secret"),
            None
        );
    }

    #[tokio::test]
    async fn test_traversal_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        assert!(matches!(
            store.remove("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.remove("nested/file.png").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
