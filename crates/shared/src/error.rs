use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("not a pdf: {file_name}")]
    NotAPdf { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum StateError {
    #[error("nothing to download")]
    NothingToDownload,
    #[error("upload already in progress")]
    UploadInProgress,
}
