use serde::Deserialize;

pub const SUMMARIZE_PATH: &str = "summarize";
pub const FILE_FIELD: &str = "file";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to summarize PDF";

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

pub fn remote_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|response| response.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}
