use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::PDF_MIME_TYPE,
    protocol::{remote_error_message, HealthResponse, FILE_FIELD, SUMMARIZE_PATH},
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::UploadError,
    types::{HealthStatus, SelectedFile, SummaryArtifact},
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[async_trait]
pub trait SummarizerTransport: Send + Sync {
    /// Uploads `file` and returns the generated summary.
    ///
    /// Non-success replies map to [`UploadError::Remote`]; anything that
    /// prevents a complete reply maps to [`UploadError::Transport`].
    async fn summarize(&self, file: SelectedFile) -> Result<SummaryArtifact, UploadError>;

    fn base_url(&self) -> &str;
}

pub struct HttpSummarizer {
    http: Client,
    base_url: Url,
}

impl HttpSummarizer {
    pub fn new(base_url: &str) -> Result<Self, UploadError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, UploadError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn summarize_url(&self) -> Result<Url, UploadError> {
        Ok(self.base_url.join(SUMMARIZE_PATH)?)
    }

    pub async fn health(&self) -> Result<HealthStatus, UploadError> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(UploadError::Remote {
                status: status.as_u16(),
                message: remote_error_message(&body),
            });
        }
        let body: HealthResponse = response.json().await?;
        Ok(HealthStatus {
            message: body.message,
        })
    }
}

#[async_trait]
impl SummarizerTransport for HttpSummarizer {
    async fn summarize(&self, file: SelectedFile) -> Result<SummaryArtifact, UploadError> {
        let url = self.summarize_url()?;
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(PDF_MIME_TYPE)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = remote_error_message(&body);
            warn!(status = status.as_u16(), %message, "summarizer rejected upload");
            return Err(UploadError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        debug!(size_bytes = bytes.len(), ?content_type, "received summary body");
        Ok(SummaryArtifact::new(bytes.to_vec(), content_type))
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

// Trailing slash so `join` keeps any path prefix.
fn normalize_base_url(raw: &str) -> Result<Url, UploadError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
