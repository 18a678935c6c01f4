use super::{field_content_type, field_reader, VideoIdPath};
use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;

const THUMBNAIL_FIELD: &str = "thumbnail";

/// `POST /api/thumbnail_upload/{video_id}`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    VideoIdPath(video_id): VideoIdPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let content_type = field_content_type(&field);
        let reader = field_reader(field);
        tokio::pin!(reader);

        let response = state
            .uploads
            .upload_thumbnail(user.user_id, video_id, &content_type, &mut reader)
            .await?;
        return Ok(Json(response));
    }

    Err(AppError::BadRequest(format!("Missing multipart field '{}'", THUMBNAIL_FIELD)).into())
}
