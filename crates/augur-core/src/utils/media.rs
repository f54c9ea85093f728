//! Helpers for turning local media files into inline data

use crate::error::AugurError;
use crate::types::InlineData;
use std::path::Path;

/// Guess a MIME type from a file extension
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => return None,
    };

    Some(mime)
}

/// File extension to use when saving media of the given MIME type
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "audio/wav" => "wav",
        _ => "bin",
    }
}

/// Read a file and encode it as inline data.
///
/// The MIME type comes from the extension; files with an unknown extension
/// are rejected rather than sent with a guessed type.
pub async fn load_inline(path: &Path) -> Result<InlineData, AugurError> {
    let mime_type = guess_mime_type(path).ok_or_else(|| {
        AugurError::validation(format!(
            "Cannot tell the media type of '{}' from its extension",
            path.display()
        ))
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AugurError::validation(format!("Failed to read '{}': {e}", path.display()))
    })?;

    if bytes.is_empty() {
        return Err(AugurError::validation(format!(
            "'{}' is empty",
            path.display()
        )));
    }

    Ok(InlineData::from_bytes(mime_type, &bytes))
}

/// Decode inline data, checking that it is of the expected kind ("image", "audio", ...)
pub fn decode_media(data: &InlineData, kind: &str) -> Result<Vec<u8>, AugurError> {
    if !data.mime_type.starts_with(kind) {
        return Err(AugurError::validation(format!(
            "Expected {kind} data but received {}",
            data.mime_type
        )));
    }
    data.decode()
}
