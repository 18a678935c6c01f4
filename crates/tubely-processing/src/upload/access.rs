use tubely_core::models::Video;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Load a video and require that `user_id` owns it.
///
/// Unknown ids are `NotFound`; videos owned by someone else are `Forbidden`.
pub async fn load_owned_video(
    videos: &dyn VideoRepository,
    user_id: Uuid,
    video_id: Uuid,
) -> Result<Video, AppError> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(user_id) {
        tracing::debug!(video_id = %video_id, user_id = %user_id, "Rejected access to foreign video");
        return Err(AppError::Forbidden(
            "You are not the owner of this video".to_string(),
        ));
    }

    Ok(video)
}
