use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::info;

use crate::error::UploadError;

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn save(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Arc<[u8]>,
    ) -> Result<PathBuf, UploadError>;
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Arc<[u8]>,
    ) -> Result<PathBuf, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            UploadError::Save(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &bytes[..])
            .await
            .map_err(|e| UploadError::Save(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), content_type, size_bytes = bytes.len(), "saved summary");
        Ok(path)
    }
}
