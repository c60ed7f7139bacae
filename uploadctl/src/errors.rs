use crate::api::models::uploads::UploadResult;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Message returned whenever a request can't be read as an upload.
pub const PARSE_FAILURE_MESSAGE: &str = "file parsing failed";

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request is not a recognised upload, or the `file` field is absent
    #[error("Failed to parse upload: {message}")]
    Parse { message: String },

    /// Writing the uploaded content to disk failed
    #[error("Failed to write {file_name}: {source}")]
    Io {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Startup or configuration failure
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    /// Upload failures are reported in the body, never through the status line.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Parse { .. } | Error::Io { .. } => StatusCode::OK,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Parse { .. } => PARSE_FAILURE_MESSAGE.to_string(),
            Error::Io { file_name, .. } => UploadResult::failure_message(file_name),
            Error::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

/// Handlers only return `Parse` or `Internal`. `Io` is folded into an [`UploadResult`] by
/// [`crate::upload::UploadHandler`] before a handler returns, and would render the same way here.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
                (status, self.user_message()).into_response()
            }
            _ => {
                tracing::warn!("{}: {}", self.user_message(), self);
                (status, Json(UploadResult::failed(self.user_message()))).into_response()
            }
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
