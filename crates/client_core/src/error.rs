use shared::error::{StateError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to save summary: {0}")]
    Save(String),
}

impl UploadError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<url::ParseError> for UploadError {
    fn from(value: url::ParseError) -> Self {
        Self::Transport(format!("invalid summarizer url: {value}"))
    }
}
