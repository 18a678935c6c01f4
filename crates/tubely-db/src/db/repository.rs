use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

/// Persistence contract for video records.
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Write back a record previously read from this repository.
    ///
    /// The write only applies if the stored `version` still equals `video.version`;
    /// otherwise it fails with `AppError::Conflict`. A missing record is
    /// `AppError::NotFound`. On success the returned record carries the bumped version.
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;
}
