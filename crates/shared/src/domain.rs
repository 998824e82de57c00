use std::fmt;

use serde::{Deserialize, Serialize};

// Compared case-sensitively: `report.PDF` is rejected.
pub const PDF_EXTENSION: &str = ".pdf";
pub const SUMMARY_FILE_NAME: &str = "summary.pdf";
pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Loading,
    Success,
    Error,
}

impl StatusCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub category: Option<StatusCategory>,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, category: Option<StatusCategory>) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    pub fn loading(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusCategory::Loading))
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusCategory::Success))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusCategory::Error))
    }

    pub fn is_error(&self) -> bool {
        self.category == Some(StatusCategory::Error)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) => write!(f, "[{}] {}", category.as_str(), self.text),
            None => f.write_str(&self.text),
        }
    }
}

pub fn has_pdf_extension(file_name: &str) -> bool {
    file_name.ends_with(PDF_EXTENSION)
}
