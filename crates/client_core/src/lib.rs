use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{
    domain::{StatusMessage, SUMMARY_FILE_NAME},
    error::{StateError, ValidationError},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

pub mod error;
pub mod sink;
pub mod transport;
pub mod types;

pub use error::UploadError;
pub use sink::{ArtifactSink, DirectorySink};
pub use transport::{HttpSummarizer, SummarizerTransport, DEFAULT_BASE_URL};
pub use types::{
    HealthStatus, SelectedFile, SummaryArtifact, UploadState, UploadStateKind,
};

pub const STATUS_NO_FILE: &str = "Please select a PDF file first!";
pub const STATUS_NOT_PDF: &str = "Please select a PDF file (.pdf)";
pub const STATUS_UPLOADING: &str =
    "Uploading PDF and generating summary... This may take 10-30 seconds.";
pub const STATUS_SUMMARY_READY: &str = "Summary generated successfully!";
pub const STATUS_NOTHING_TO_DOWNLOAD: &str = "No summary available to download";
pub const STATUS_UPLOAD_IN_PROGRESS: &str = "An upload is already in progress; please wait";
pub const STATUS_DOWNLOADED: &str = "Summary downloaded!";

pub const SUBMIT_LABEL_IDLE: &str = "Summarize PDF";
pub const SUBMIT_LABEL_BUSY: &str = "Processing...";

const UPLOAD_ABANDONED: &str = "upload abandoned before a response arrived";
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    StatusChanged(StatusMessage),
    SubmitControlChanged { enabled: bool, label: &'static str },
    DownloadAvailabilityChanged(bool),
    ArtifactSaved(PathBuf),
}

pub fn status_for_error(err: &UploadError) -> StatusMessage {
    match err {
        UploadError::Validation(ValidationError::NoFileSelected) => {
            StatusMessage::error(STATUS_NO_FILE)
        }
        UploadError::Validation(ValidationError::NotAPdf { .. }) => {
            StatusMessage::error(STATUS_NOT_PDF)
        }
        UploadError::State(StateError::NothingToDownload) => {
            StatusMessage::error(STATUS_NOTHING_TO_DOWNLOAD)
        }
        UploadError::State(StateError::UploadInProgress) => {
            StatusMessage::error(STATUS_UPLOAD_IN_PROGRESS)
        }
        other => StatusMessage::error(format!("Error: {other}")),
    }
}

#[derive(Default)]
struct ControllerInner {
    state: UploadState,
    artifact: Option<SummaryArtifact>,
    status: Option<StatusMessage>,
}

impl ControllerInner {
    fn download_enabled(&self) -> bool {
        self.artifact.is_some() && !self.state.is_uploading()
    }
}

/// Uploads a selected PDF, holds the returned summary and saves it on request.
pub struct UploadController {
    transport: Arc<dyn SummarizerTransport>,
    sink: Arc<dyn ArtifactSink>,
    inner: Mutex<ControllerInner>,
    events: broadcast::Sender<ControllerEvent>,
}

impl UploadController {
    pub fn new(transport: Arc<dyn SummarizerTransport>, sink: Arc<dyn ArtifactSink>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            sink,
            inner: Mutex::new(ControllerInner::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn state(&self) -> UploadState {
        self.lock_inner().state.clone()
    }

    pub fn state_kind(&self) -> UploadStateKind {
        self.lock_inner().state.kind()
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.lock_inner().status.clone()
    }

    pub fn artifact(&self) -> Option<SummaryArtifact> {
        self.lock_inner().artifact.clone()
    }

    pub fn is_submit_enabled(&self) -> bool {
        !self.lock_inner().state.is_uploading()
    }

    pub fn is_download_enabled(&self) -> bool {
        self.lock_inner().download_enabled()
    }

    /// Validates `file` and uploads it to the summarizer.
    ///
    /// Submission is disabled for the duration of the request and re-enabled
    /// on every exit path, including the returned future being dropped.
    pub async fn submit(&self, file: Option<SelectedFile>) -> Result<(), UploadError> {
        let file = match types::validate_selection(file) {
            Ok(file) => file,
            Err(err) => {
                warn!(%err, "rejected selected file");
                self.report_status(status_for_error(&err));
                return Err(err);
            }
        };

        let guard = match self.begin_upload(&file.name) {
            Ok(guard) => guard,
            Err(err) => {
                warn!(%err, file = %file.name, "submit ignored");
                self.report_status(status_for_error(&err));
                return Err(err);
            }
        };

        self.report_status(StatusMessage::loading(STATUS_UPLOADING));
        info!(
            base_url = self.base_url(),
            file = %file.name,
            size_bytes = file.bytes.len(),
            "uploading pdf for summary"
        );

        let outcome = self.transport.summarize(file).await;
        guard.finish(outcome)
    }

    pub async fn download(&self) -> Result<PathBuf, UploadError> {
        let Some(artifact) = self.artifact() else {
            let err = UploadError::from(StateError::NothingToDownload);
            warn!(%err, "download requested without a summary");
            self.report_status(status_for_error(&err));
            return Err(err);
        };

        // The sink's handle to the bytes is dropped as soon as the save returns.
        let saved = self
            .sink
            .save(SUMMARY_FILE_NAME, artifact.content_type(), artifact.share_bytes())
            .await;

        match saved {
            Ok(path) => {
                if self.mark_downloaded(&artifact) {
                    self.report_status(StatusMessage::success(STATUS_DOWNLOADED));
                } else {
                    debug!(path = %path.display(), "saved a summary that is no longer current");
                }
                self.emit(ControllerEvent::ArtifactSaved(path.clone()));
                Ok(path)
            }
            Err(err) => {
                error!(%err, "saving summary failed");
                self.report_status(status_for_error(&err));
                Err(err)
            }
        }
    }

    pub fn report_status(&self, status: StatusMessage) {
        debug!(text = %status.text, category = ?status.category, "status");
        self.lock_inner().status = Some(status.clone());
        self.emit(ControllerEvent::StatusChanged(status));
    }

    fn begin_upload(&self, file_name: &str) -> Result<SubmitGuard<'_>, UploadError> {
        let had_artifact = {
            let mut inner = self.lock_inner();
            if inner.state.is_uploading() {
                return Err(StateError::UploadInProgress.into());
            }
            let had_artifact = inner.download_enabled();
            inner.state = UploadState::Uploading {
                file_name: file_name.to_string(),
            };
            had_artifact
        };

        self.emit(ControllerEvent::SubmitControlChanged {
            enabled: false,
            label: SUBMIT_LABEL_BUSY,
        });
        if had_artifact {
            self.emit(ControllerEvent::DownloadAvailabilityChanged(false));
        }
        Ok(SubmitGuard { controller: self })
    }

    // False when `saved` was replaced, or a new upload started, while the save ran.
    fn mark_downloaded(&self, saved: &SummaryArtifact) -> bool {
        let mut inner = self.lock_inner();
        let current = inner
            .artifact
            .as_ref()
            .is_some_and(|held| held.is_same(saved));
        if !current || inner.state.is_uploading() {
            return false;
        }
        let downloads = match inner.state {
            UploadState::Downloaded { downloads } => downloads.saturating_add(1),
            _ => 1,
        };
        inner.state = UploadState::Downloaded { downloads };
        true
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    fn lock_inner(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Re-enables submission when dropped, whether the upload finished or was abandoned.
struct SubmitGuard<'a> {
    controller: &'a UploadController,
}

impl SubmitGuard<'_> {
    fn finish(self, outcome: Result<SummaryArtifact, UploadError>) -> Result<(), UploadError> {
        let controller = self.controller;
        match outcome {
            Ok(artifact) => {
                info!(
                    size_bytes = artifact.len(),
                    content_type = artifact.content_type(),
                    "summary ready"
                );
                {
                    let mut inner = controller.lock_inner();
                    inner.state = UploadState::Ready;
                    inner.artifact = Some(artifact);
                }
                controller.report_status(StatusMessage::success(STATUS_SUMMARY_READY));
                controller.emit(ControllerEvent::DownloadAvailabilityChanged(true));
                Ok(())
            }
            Err(err) => {
                error!(%err, "upload failed");
                let keeps_previous = {
                    let mut inner = controller.lock_inner();
                    inner.state = UploadState::Failed {
                        error: err.to_string(),
                    };
                    inner.artifact.is_some()
                };
                controller.report_status(status_for_error(&err));
                if keeps_previous {
                    controller.emit(ControllerEvent::DownloadAvailabilityChanged(true));
                }
                Err(err)
            }
        }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let (abandoned, keeps_previous) = {
            let mut inner = self.controller.lock_inner();
            if inner.state.is_uploading() {
                inner.state = UploadState::Failed {
                    error: UPLOAD_ABANDONED.to_string(),
                };
                (true, inner.artifact.is_some())
            } else {
                (false, false)
            }
        };
        if abandoned {
            warn!("upload abandoned before completion");
            if keeps_previous {
                self.controller
                    .emit(ControllerEvent::DownloadAvailabilityChanged(true));
            }
        }
        self.controller.emit(ControllerEvent::SubmitControlChanged {
            enabled: true,
            label: SUBMIT_LABEL_IDLE,
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
