//! Image attachments encoded as data URIs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DraftError;

/// Mime type for an image file, judged by its extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str, DraftError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        "svg" => Ok("image/svg+xml"),
        _ => Err(DraftError::UnsupportedImage(path.display().to_string())),
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read an image file and encode it as a data URI.
pub async fn read_data_uri(path: &Path) -> Result<String, DraftError> {
    let mime = mime_for_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoded image");
    Ok(encode_data_uri(mime, &bytes))
}
