//! Declared content types for uploads.
//!
//! Uploads are accepted on the content type the client declares for the multipart part.
//! The payload bytes are never sniffed.

use crate::AppError;
use mime::Mime;

/// The only container accepted on the video endpoint.
pub const VIDEO_MP4: &str = "video/mp4";

/// Image types accepted on the thumbnail endpoint.
pub const THUMBNAIL_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// A parsed, normalized declared content type (`type/subtype`, no parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredMediaType(Mime);

impl DeclaredMediaType {
    /// Parse a raw `Content-Type` value. Parameters such as `charset` are dropped.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mime: Mime = raw
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid content type '{}'", raw)))?;
        Ok(Self(mime))
    }

    /// Parse and require the type to be one of `allowed`.
    pub fn parse_allowed(raw: &str, allowed: &[&str]) -> Result<Self, AppError> {
        let media_type = Self::parse(raw)?;
        if !allowed.contains(&media_type.essence()) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported content type '{}'. Allowed types: {}",
                media_type.essence(),
                allowed.join(", ")
            )));
        }
        Ok(media_type)
    }

    /// `type/subtype`, lowercased by the parser.
    pub fn essence(&self) -> &str {
        self.0.essence_str()
    }

    /// File extension implied by the subtype (`video/mp4` -> `mp4`, `image/jpeg` -> `jpeg`).
    pub fn extension(&self) -> &str {
        self.0.subtype().as_str()
    }
}

impl std::fmt::Display for DeclaredMediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.essence())
    }
}
