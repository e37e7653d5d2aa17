//! RFC9457-style API error wrapper.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rendersort_fsops::FsOpsError;
use tracing::error;

use crate::http::constants::{
    CONTENT_TYPE_PROBLEM, PROBLEM_BAD_REQUEST, PROBLEM_CONFLICT, PROBLEM_INTERNAL,
    PROBLEM_PAYLOAD_TOO_LARGE,
};
use crate::models::ProblemDetails;

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            PROBLEM_PAYLOAD_TOO_LARGE,
            "payload too large",
        )
        .with_detail(detail)
    }

    pub(crate) fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, PROBLEM_CONFLICT, "conflict").with_detail(detail)
    }
}

impl From<FsOpsError> for ApiError {
    fn from(err: FsOpsError) -> Self {
        match &err {
            FsOpsError::InvalidInput { field, reason, .. } => {
                Self::bad_request(format!("{field}: {reason}"))
            }
            FsOpsError::Zip { .. } => Self::bad_request("upload is not a readable zip archive"),
            FsOpsError::Unsupported { operation, .. } => {
                Self::bad_request(format!("unsupported operation: {operation}"))
            }
            FsOpsError::DestinationExists { .. } => {
                Self::conflict("destination already exists")
            }
            FsOpsError::Io { .. } | FsOpsError::Walkdir { .. } | FsOpsError::MissingState { .. } => {
                error!(error = %err, error_debug = ?err, "processing failed");
                Self::internal("processing failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
        };
        let mut response = (self.status, Json(body)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static(CONTENT_TYPE_PROBLEM),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsops_errors_map_to_problem_statuses() {
        let invalid: ApiError = FsOpsError::InvalidInput {
            field: "archive_entry",
            reason: "invalid_segment",
            value: Some("../x.png".to_string()),
        }
        .into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.detail.as_deref(), Some("archive_entry: invalid_segment"));

        let missing: ApiError = FsOpsError::MissingState { field: "items" }.into();
        assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing.kind, PROBLEM_INTERNAL);

        let exists: ApiError = FsOpsError::DestinationExists {
            path: "out/a.png".into(),
        }
        .into();
        assert_eq!(exists.status, StatusCode::CONFLICT);
    }

    #[test]
    fn problem_response_uses_problem_content_type() {
        let response = ApiError::payload_too_large("too big").into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static(CONTENT_TYPE_PROBLEM))
        );
    }
}
