//! Upload orchestration: buffer → inspect → remux → publish → record → resolve.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncRead;
use uuid::Uuid;

use tubely_core::media_type::{DeclaredMediaType, THUMBNAIL_TYPES, VIDEO_MP4};
use tubely_core::models::{StoredObject, VideoResponse};
use tubely_core::AppError;
use tubely_db::VideoRepository;
use tubely_storage::keys::video_object_key;
use tubely_storage::{
    write_limited, AssetStore, ObjectUploader, ReferenceResolver, StorageError,
};

use super::access::load_owned_video;
use crate::media::MediaTool;

const UPLOAD_FILE_NAME: &str = "upload.mp4";
const TEMP_DIR_PREFIX: &str = "tubely-upload-";

/// Settings for the upload pipeline.
#[derive(Debug, Clone)]
pub struct UploadOrchestratorConfig {
    /// Bucket every video object is written to
    pub bucket: String,
    /// Parent of the per-request temp directories; the system temp dir when unset
    pub temp_root: Option<PathBuf>,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
}

/// Drives video and thumbnail uploads end to end.
///
/// Every request gets a private temp directory that is removed when the request
/// finishes, whatever the outcome.
pub struct UploadOrchestrator {
    videos: Arc<dyn VideoRepository>,
    media_tool: Arc<dyn MediaTool>,
    uploader: Arc<dyn ObjectUploader>,
    resolver: ReferenceResolver,
    assets: Arc<AssetStore>,
    config: UploadOrchestratorConfig,
}

impl UploadOrchestrator {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        media_tool: Arc<dyn MediaTool>,
        uploader: Arc<dyn ObjectUploader>,
        resolver: ReferenceResolver,
        assets: Arc<AssetStore>,
        config: UploadOrchestratorConfig,
    ) -> Self {
        Self {
            videos,
            media_tool,
            uploader,
            resolver,
            assets,
            config,
        }
    }

    fn create_temp_dir(&self) -> Result<TempDir, AppError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_DIR_PREFIX);
        let dir = match &self.config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| AppError::Internal(format!("Failed to create temp directory: {}", e)))
    }

    /// Accept an MP4 upload for `video_id`, publish a fast-start copy and record it.
    ///
    /// Ownership and content type are checked before any byte of `body` is read.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload_video<R>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        content_type: &str,
        body: &mut R,
    ) -> Result<VideoResponse, AppError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let start = std::time::Instant::now();

        let mut video = load_owned_video(self.videos.as_ref(), user_id, video_id).await?;
        let media_type = DeclaredMediaType::parse_allowed(content_type, &[VIDEO_MP4])?;

        let temp_dir = self.create_temp_dir()?;
        let upload_path = temp_dir.path().join(UPLOAD_FILE_NAME);

        let size_bytes = write_limited(body, &upload_path, self.config.max_video_size_bytes)
            .await
            .map_err(|e| match e {
                StorageError::TooLarge { .. } => AppError::from(e),
                other => AppError::Internal(format!("Failed to buffer upload: {}", other)),
            })?;
        if size_bytes == 0 {
            return Err(AppError::InvalidInput("Video file is empty".to_string()));
        }
        tracing::info!(size_bytes, "Upload buffered");

        let geometry = self.media_tool.inspect(&upload_path).await?;
        let orientation = geometry.orientation();
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            orientation = %orientation,
            "Video inspected"
        );

        let processed_path = self.media_tool.remux_fast_start(&upload_path).await?;

        let bucket = self.config.bucket.as_str();
        let key = video_object_key(orientation, media_type.extension());

        self.uploader
            .upload_file(bucket, &key, media_type.essence(), &processed_path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        video.video = Some(StoredObject::new(bucket, key.clone()));
        let saved = match self.videos.update_video(&video).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Video record update failed; uploaded object is orphaned"
                );
                return Err(e);
            }
        };

        if let Err(e) = temp_dir.close() {
            tracing::warn!(error = %e, "Failed to remove upload temp directory");
        }

        let response = self.resolver.resolve(&saved).await?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video upload completed"
        );

        Ok(response)
    }

    /// Accept a JPEG or PNG thumbnail for `video_id` and serve it as a static asset.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload_thumbnail<R>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        content_type: &str,
        body: &mut R,
    ) -> Result<VideoResponse, AppError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let start = std::time::Instant::now();

        let mut video = load_owned_video(self.videos.as_ref(), user_id, video_id).await?;
        let media_type = DeclaredMediaType::parse_allowed(content_type, THUMBNAIL_TYPES)?;

        let asset = self
            .assets
            .store(
                body,
                media_type.extension(),
                self.config.max_thumbnail_size_bytes,
            )
            .await
            .map_err(|e| match e {
                StorageError::TooLarge { .. } | StorageError::EmptyContent => AppError::from(e),
                other => AppError::Internal(format!("Failed to store thumbnail: {}", other)),
            })?;

        let previous_url = video.thumbnail_url.replace(asset.url.clone());
        let saved = match self.videos.update_video(&video).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Err(remove_err) = self.assets.remove(&asset.file_name).await {
                    tracing::warn!(
                        error = %remove_err,
                        file = %asset.file_name,
                        "Failed to remove thumbnail after record update failure"
                    );
                }
                return Err(e);
            }
        };

        if let Some(old_file) = previous_url
            .as_deref()
            .and_then(|url| self.assets.file_name_from_url(url))
        {
            if let Err(e) = self.assets.remove(old_file).await {
                tracing::warn!(error = %e, file = %old_file, "Failed to remove replaced thumbnail");
            }
        }

        let response = self.resolver.resolve(&saved).await?;

        tracing::info!(
            file = %asset.file_name,
            content_type = %media_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail upload completed"
        );

        Ok(response)
    }
}
