//! Size-limited streaming of request bodies to local files.

use crate::traits::{StorageError, StorageResult};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 64 * 1024;

/// Copy `reader` into a new file at `path`, flushing and syncing it before returning.
///
/// Fails with `StorageError::TooLarge` as soon as more than `max_bytes` have been read.
/// The partially written file is left for the caller to discard. Returns the number of
/// bytes written.
pub async fn write_limited<R>(reader: &mut R, path: &Path, max_bytes: u64) -> StorageResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = fs::File::create(path).await?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        written += n as u64;
        if written > max_bytes {
            return Err(StorageError::TooLarge { limit: max_bytes });
        }
        file.write_all(&buf[..n]).await?;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_whole_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        let mut body: &[u8] = b"fake mp4 payload";

        let written = write_limited(&mut body, &path, 1024).await.unwrap();
        assert_eq!(written, 16);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake mp4 payload");
    }

    #[tokio::test]
    async fn test_stops_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        let data = vec![7u8; 4096];
        let mut body: &[u8] = &data;

        let err = write_limited(&mut body, &path, 1000).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { limit: 1000 }));
    }

    #[tokio::test]
    async fn test_body_of_exactly_max_bytes_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        let data = [0u8; 1000];
        let mut body: &[u8] = &data;

        assert_eq!(write_limited(&mut body, &path, 1000).await.unwrap(), 1000);
        assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_empty_body_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        let mut body: &[u8] = b"";
        assert_eq!(write_limited(&mut body, &path, 10).await.unwrap(), 0);
    }
}
