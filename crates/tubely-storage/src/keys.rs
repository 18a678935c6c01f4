//! Object key and asset name generation.
//!
//! Video keys have the form `{orientation}/{token}.{extension}`. Thumbnail assets use
//! `{token}.{extension}` with no prefix. The token is 32 random bytes encoded as
//! unpadded base64url, so it never contains `/`, `+` or `=`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tubely_core::models::Orientation;

/// 32 random bytes as unpadded base64url (43 characters).
pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Object key for an uploaded video.
pub fn video_object_key(orientation: Orientation, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        orientation.key_prefix(),
        random_token(),
        extension
    )
}

/// File name for a thumbnail asset.
pub fn asset_file_name(extension: &str) -> String {
    format!("{}.{}", random_token(), extension)
}
