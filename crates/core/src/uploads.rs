//! Upload seam: blobs go to an external store, records keep only the reference.

use async_trait::async_trait;

use crate::error::CoreError;

/// File extensions accepted by the upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "gif", "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx",
];

const MAX_FILE_NAME_LEN: usize = 100;

/// Stores an uploaded blob and returns a stable reference (path or URL).
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, CoreError>;
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`, without leading dots.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let mut name = truncate_keeping_extension(trimmed);
    if name.is_empty() {
        name.push_str("upload");
    }
    name
}

/// Shorten an ASCII name to `MAX_FILE_NAME_LEN` by cutting the stem, so the
/// extension survives.
fn truncate_keeping_extension(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_LEN {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() + 1 < MAX_FILE_NAME_LEN => {
            let keep = MAX_FILE_NAME_LEN - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep])
        }
        _ => name[..MAX_FILE_NAME_LEN].to_string(),
    }
}

/// Check extension and size before a blob is handed to the store.
pub fn validate_upload(file_name: &str, size: usize, max_bytes: usize) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("uploaded file is empty".into()));
    }
    if size > max_bytes {
        return Err(CoreError::Validation(format!(
            "uploaded file exceeds {max_bytes} bytes"
        )));
    }
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CoreError::Validation(format!(
            "file type '.{extension}' is not allowed"
        )));
    }
    Ok(())
}
