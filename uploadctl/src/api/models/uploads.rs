use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::PARSE_FAILURE_MESSAGE;

/// A file pulled out of an upload request, ready to be persisted.
///
/// Built by the request adapters; the name is exactly what the client submitted and may carry
/// path separators.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            content: content.into(),
        }
    }
}

/// Outcome of a single upload, returned as the response body of every upload route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResult {
    /// Whether the file was written to disk
    success: bool,
    /// Human-readable outcome, naming the resolved file where there is one
    #[serde(rename = "msg")]
    message: String,
}

impl UploadResult {
    pub fn succeeded(file_name: &str) -> Self {
        Self {
            success: true,
            message: format!("{file_name} uploaded successfully"),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn parse_failure() -> Self {
        Self::failed(PARSE_FAILURE_MESSAGE)
    }

    pub fn failure_message(file_name: &str) -> String {
        format!("{file_name} upload failed")
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_message_as_msg() {
        let json = serde_json::to_value(UploadResult::succeeded("report.pdf")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "msg": "report.pdf uploaded successfully"}));
    }

    #[test]
    fn test_parse_failure_result() {
        let result = UploadResult::parse_failure();
        assert!(!result.success());
        assert_eq!(result.message(), "file parsing failed");
    }
}
