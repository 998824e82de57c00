use std::{fmt, path::Path, sync::Arc};

use shared::domain::{has_pdf_extension, PDF_MIME_TYPE};

use crate::error::UploadError;

#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    pub fn is_pdf(&self) -> bool {
        has_pdf_extension(&self.name)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct SummaryArtifact {
    bytes: Arc<[u8]>,
    content_type: Option<String>,
}

impl SummaryArtifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn share_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(PDF_MIME_TYPE)
    }

    pub fn is_same(&self, other: &SummaryArtifact) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    #[cfg(test)]
    pub(crate) fn reference_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }
}

impl fmt::Debug for SummaryArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryArtifact")
            .field("size_bytes", &self.bytes.len())
            .field("content_type", &self.content_type())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub message: String,
}

// The held summary lives beside this state, not inside it: only a successful
// upload replaces it, so it survives `Uploading` and `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading {
        file_name: String,
    },
    Ready,
    Downloaded {
        downloads: u32,
    },
    Failed {
        error: String,
    },
}

impl UploadState {
    pub fn kind(&self) -> UploadStateKind {
        match self {
            Self::Idle => UploadStateKind::Idle,
            Self::Uploading { .. } => UploadStateKind::Uploading,
            Self::Ready => UploadStateKind::Ready,
            Self::Downloaded { .. } => UploadStateKind::Downloaded,
            Self::Failed { .. } => UploadStateKind::Failed,
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStateKind {
    Idle,
    Uploading,
    Ready,
    Downloaded,
    Failed,
}

pub(crate) fn validate_selection(file: Option<SelectedFile>) -> Result<SelectedFile, UploadError> {
    let file = file.ok_or(shared::error::ValidationError::NoFileSelected)?;
    if !file.is_pdf() {
        return Err(shared::error::ValidationError::NotAPdf {
            file_name: file.name,
        }
        .into());
    }
    Ok(file)
}
