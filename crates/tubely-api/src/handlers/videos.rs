use super::VideoIdPath;
use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tubely_core::models::{CreateVideoRequest, Video, VideoResponse};
use tubely_core::AppError;
use tubely_processing::load_owned_video;

const MAX_TITLE_CHARS: usize = 255;

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        ))
        .into());
    }

    let video = Video::new(user.user_id, title.to_string(), request.description);
    let created = state.videos.create_video(&video).await?;
    tracing::info!(video_id = %created.id, user_id = %user.user_id, "Video created");

    let response = state.resolver.resolve(&created).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let videos = state.videos.list_videos_for_user(user.user_id).await?;
    let resolved = state.resolver.resolve_all(&videos).await?;
    Ok(Json(resolved))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    VideoIdPath(video_id): VideoIdPath,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = load_owned_video(state.videos.as_ref(), user.user_id, video_id).await?;
    let response = state.resolver.resolve(&video).await?;
    Ok(Json(response))
}
