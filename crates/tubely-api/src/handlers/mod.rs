pub mod health;
pub mod thumbnail_upload;
pub mod video_upload;
pub mod videos;

use crate::error::HttpAppError;
use axum::extract::multipart::Field;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use futures::TryStreamExt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use uuid::Uuid;

/// `{video_id}` path segment parsed as a UUID.
///
/// Rejects with `InvalidInput` so malformed ids get the JSON error shape.
#[derive(Debug, Clone, Copy)]
pub struct VideoIdPath(pub Uuid);

impl<S> FromRequestParts<S> for VideoIdPath
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::InvalidInput(format!("Invalid video ID: {}", raw)))?;
        Ok(VideoIdPath(id))
    }
}

/// Read a multipart file field as a byte stream without buffering it in memory.
pub(crate) fn field_reader<'a>(field: Field<'a>) -> impl AsyncRead + Send + 'a {
    StreamReader::new(field.map_err(io::Error::other))
}

/// Declared content type of a file part; empty when the client sent none.
pub(crate) fn field_content_type(field: &Field<'_>) -> String {
    field.content_type().unwrap_or_default().to_string()
}
