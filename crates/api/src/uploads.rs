//! Filesystem-backed [`UploadStore`].

use std::path::PathBuf;

use async_trait::async_trait;
use plug_core::error::CoreError;
use plug_core::uploads::{sanitize_file_name, UploadStore};
use uuid::Uuid;

/// URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Writes blobs under a local directory and returns `/uploads/<name>`.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, CoreError> {
        let name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let path = self.dir.join(&name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoreError::Internal(format!("create upload dir: {e}")))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("write upload {}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(format!("{UPLOADS_URL_PREFIX}/{name}"))
    }
}
