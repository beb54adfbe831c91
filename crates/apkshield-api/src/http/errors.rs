//! `{error, details}` response wrapper for handler failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use apkshield_jobs::JobError;

/// JSON body rendered for every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Short, constant description of the failure kind.
    pub error: String,
    /// Request-specific detail when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Structured API error mapped onto an HTTP status and [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            error: error.into(),
            details: None,
        }
    }

    pub(crate) fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub(crate) fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", error)
    }

    pub(crate) fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", error)
    }

    /// Metrics label for the terminal outcome of a protect request.
    #[must_use]
    pub(crate) const fn outcome(&self) -> &'static str {
        self.kind
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        let details = err.detail();
        match &err {
            JobError::Validation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "validation", err.to_string())
                    .with_details(details)
            }
            JobError::ToolExecution { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "tool_failed", "protection failed")
                    .with_details(details)
            }
            JobError::Timeout { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "timeout", "protection timed out")
                    .with_details(details)
            }
            JobError::Environment { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "environment",
                "protection environment unavailable",
            )
            .with_details(details),
            JobError::Io { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
                    .with_details(details)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_errors_map_to_their_status_codes() {
        let cases = [
            (
                JobError::Validation {
                    code: "bad_extension",
                    reason: "invalid file type".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                JobError::ToolExecution {
                    status: Some(1),
                    detail: "stderr".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                JobError::Timeout { limit_secs: 300 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                JobError::Environment {
                    what: "java",
                    detail: "missing".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, expected);
        }
    }

    #[test]
    fn timeout_and_tool_failure_read_differently() {
        let timeout: ApiError = JobError::Timeout { limit_secs: 300 }.into();
        let tool: ApiError = JobError::ToolExecution {
            status: Some(1),
            detail: "x".to_string(),
        }
        .into();
        assert_ne!(timeout.error, tool.error);
        assert_ne!(timeout.outcome(), tool.outcome());
    }

    #[test]
    fn details_are_omitted_from_json_when_absent() {
        let body = ErrorBody {
            error: "nope".to_string(),
            details: None,
        };
        let rendered = serde_json::to_string(&body).expect("serialize");
        assert_eq!(rendered, r#"{"error":"nope"}"#);
    }
}
