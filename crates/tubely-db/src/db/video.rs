//! PostgreSQL video repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::models::{StoredObject, Video};
use tubely_core::AppError;
use uuid::Uuid;

use super::repository::VideoRepository;

const VIDEO_COLUMNS: &str = "id, user_id, title, description, video_bucket, video_key, \
                             thumbnail_url, created_at, updated_at, version";

/// Row type for the videos table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_bucket: Option<String>,
    pub video_key: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl VideoRow {
    pub fn into_video(self) -> Video {
        Video {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            video: StoredObject::from_columns(self.video_bucket, self.video_key),
            thumbnail_url: self.thumbnail_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

/// Repository for the videos table
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let (bucket, key) = reference_columns(video);

        let row = sqlx::query_as::<Postgres, VideoRow>(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description, video_bucket, video_key,
                                thumbnail_url, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(bucket)
        .bind(key)
        .bind(&video.thumbnail_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .bind(video.version)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_video())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VideoRow::into_video))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VideoRow::into_video).collect())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let (bucket, key) = reference_columns(video);

        let updated = sqlx::query_as::<Postgres, VideoRow>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, video_bucket = $4, video_key = $5,
                thumbnail_url = $6, updated_at = NOW(), version = version + 1
            WHERE id = $1 AND version = $7
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(bucket)
        .bind(key)
        .bind(&video.thumbnail_url)
        .bind(video.version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(row.into_video());
        }

        // Nothing matched: either the record is gone or another writer got there first.
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)",
        )
        .bind(video.id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            tracing::warn!(video_id = %video.id, version = video.version, "Stale video update rejected");
            Err(AppError::Conflict(format!(
                "Video {} was modified concurrently",
                video.id
            )))
        } else {
            Err(AppError::NotFound(format!("Video {} not found", video.id)))
        }
    }
}

fn reference_columns(video: &Video) -> (Option<&str>, Option<&str>) {
    match &video.video {
        Some(object) => (Some(object.bucket.as_str()), Some(object.key.as_str())),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bucket: Option<&str>, key: Option<&str>) -> VideoRow {
        let now = Utc::now();
        VideoRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Boots".to_string(),
            description: String::new(),
            video_bucket: bucket.map(str::to_string),
            video_key: key.map(str::to_string),
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
            version: 3,
        }
    }

    #[test]
    fn test_row_with_both_columns_maps_to_reference() {
        let video = row(Some("tubely"), Some("landscape/abc.mp4")).into_video();
        assert_eq!(
            video.video,
            Some(StoredObject::new("tubely", "landscape/abc.mp4"))
        );
        assert_eq!(video.version, 3);
    }

    #[test]
    fn test_row_with_partial_columns_has_no_reference() {
        assert!(row(Some("tubely"), None).into_video().video.is_none());
        assert!(row(None, None).into_video().video.is_none());
    }

    #[test]
    fn test_reference_columns_split() {
        let mut video = row(None, None).into_video();
        assert_eq!(reference_columns(&video), (None, None));
        video.video = Some(StoredObject::new("b", "k"));
        assert_eq!(reference_columns(&video), (Some("b"), Some("k")));
    }
}
