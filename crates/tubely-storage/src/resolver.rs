//! Turns stored video references into signed, time-limited links.

use crate::traits::{StorageResult, UrlSigner};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::models::{Video, VideoResponse};

/// Signs the stored reference of a video on every read.
///
/// Resolution never touches the record. A video without a reference resolves with no URL.
#[derive(Clone)]
pub struct ReferenceResolver {
    signer: Arc<dyn UrlSigner>,
    ttl: Duration,
}

impl ReferenceResolver {
    pub fn new(signer: Arc<dyn UrlSigner>, ttl: Duration) -> Self {
        Self { signer, ttl }
    }

    pub async fn resolve(&self, video: &Video) -> StorageResult<VideoResponse> {
        let video_url = match &video.video {
            Some(object) => Some(
                self.signer
                    .presigned_get_url(&object.bucket, &object.key, self.ttl)
                    .await?,
            ),
            None => None,
        };
        Ok(VideoResponse::from_video(video, video_url))
    }

    /// Resolve a batch in order, failing on the first signing error.
    pub async fn resolve_all(&self, videos: &[Video]) -> StorageResult<Vec<VideoResponse>> {
        let mut resolved = Vec::with_capacity(videos.len());
        for video in videos {
            resolved.push(self.resolve(video).await?);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StorageError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tubely_core::models::StoredObject;
    use uuid::Uuid;

    #[derive(Default)]
    struct CountingSigner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UrlSigner for CountingSigner {
        async fn presigned_get_url(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}&sig={}",
                bucket,
                key,
                expires_in.as_secs(),
                n
            ))
        }
    }

    struct FailingSigner;

    #[async_trait]
    impl UrlSigner for FailingSigner {
        async fn presigned_get_url(&self, _: &str, _: &str, _: Duration) -> StorageResult<String> {
            Err(StorageError::BackendError("credentials expired".into()))
        }
    }

    fn stored_video() -> Video {
        let mut video = Video::new(Uuid::new_v4(), "Boots".into(), "".into());
        video.video = Some(StoredObject::new("tubely", "landscape/abc.mp4"));
        video
    }

    #[tokio::test]
    async fn test_resolve_signs_stored_reference() {
        let resolver =
            ReferenceResolver::new(Arc::new(CountingSigner::default()), Duration::from_secs(900));
        let response = resolver.resolve(&stored_video()).await.unwrap();
        let url = response.video_url.unwrap();
        assert!(url.starts_with("https://tubely.s3.amazonaws.com/landscape/abc.mp4?"));
        assert!(url.contains("X-Amz-Expires=900"));
    }

    #[tokio::test]
    async fn test_resolving_twice_targets_same_object() {
        let resolver =
            ReferenceResolver::new(Arc::new(CountingSigner::default()), Duration::from_secs(60));
        let video = stored_video();
        let first = resolver.resolve(&video).await.unwrap().video_url.unwrap();
        let second = resolver.resolve(&video).await.unwrap().video_url.unwrap();

        assert_ne!(first, second);
        let object = |url: &str| url.split('?').next().unwrap_or_default().to_string();
        assert_eq!(object(&first), object(&second));
    }

    #[tokio::test]
    async fn test_no_reference_means_no_url() {
        let signer = Arc::new(CountingSigner::default());
        let resolver = ReferenceResolver::new(signer.clone(), Duration::from_secs(60));
        let video = Video::new(Uuid::new_v4(), "Draft".into(), "".into());

        let response = resolver.resolve(&video).await.unwrap();
        assert!(response.video_url.is_none());
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_signer_failure_propagates() {
        let resolver = ReferenceResolver::new(Arc::new(FailingSigner), Duration::from_secs(60));
        assert!(matches!(
            resolver.resolve(&stored_video()).await,
            Err(StorageError::BackendError(_))
        ));
    }
}
