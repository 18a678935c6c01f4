use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location of an object in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
}

impl StoredObject {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Build a reference from the two nullable columns it is persisted in.
    ///
    /// Only a pair with both halves set is a reference.
    pub fn from_columns(bucket: Option<String>, key: Option<String>) -> Option<Self> {
        match (bucket, key) {
            (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                Some(Self { bucket, key })
            }
            _ => None,
        }
    }
}

/// A video record as persisted.
///
/// `video` is only ever set after the object behind it was stored successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video: Option<StoredObject>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl Video {
    pub fn new(user_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            video: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Client view of a video. `video_url` is a freshly signed link, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_video(video: &Video, video_url: Option<String>) -> Self {
        Self {
            id: video.id,
            user_id: video.user_id,
            title: video.title.clone(),
            description: video.description.clone(),
            video_url,
            thumbnail_url: video.thumbnail_url.clone(),
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
