//! Mapping of launchpad errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// An error returned from an HTTP handler.
///
/// Rendered as `{"error": message}`. Storage and other internal failures are
/// logged and reported with a generic message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// The status code this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_validation_error() => StatusCode::BAD_REQUEST,
            Error::AbortFailed { .. } => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            e if e.is_validation_error() || e.is_not_found() => e.to_string(),
            Error::AbortFailed { .. } | Error::ScheduleFailed => self.0.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_storage_error() {
            error!(error = %self.0, "Storage failure while handling request");
        } else if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
