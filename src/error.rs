use crate::models::{Category, ValidationIssue};
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

/// The model reply held no bracketed span that parses as JSON.
#[derive(Debug, Clone, Error)]
#[error("model reply is not JSON: {reason}")]
pub struct MalformedResponse {
    pub reason: String,
    /// Full reply text, kept for diagnostics.
    pub raw: String,
}

#[derive(Debug, Error)]
pub enum GenerationCause {
    #[error("model call failed: {0}")]
    Upstream(String),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error("unexpected reply shape: {0}")]
    UnexpectedShape(String),
}

/// One category could not be produced. Never aborts a whole quiz.
#[derive(Debug, Error)]
#[error("failed to generate {category} questions: {cause}")]
pub struct GenerationFailure {
    pub category: Category,
    #[source]
    pub cause: GenerationCause,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quiz {0} not found")]
    NotFound(i64),
    #[error("quiz store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("invalid request: {message}")]
    InvalidRequest {
        message: String,
        issues: Vec<ValidationIssue>,
    },
    #[error("quiz {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => QuizError::NotFound(id),
            other => QuizError::Storage(other),
        }
    }
}

impl QuizError {
    pub fn invalid(issues: Vec<ValidationIssue>) -> Self {
        let message = if issues.iter().any(|i| i.field == "topic" || i.field == "difficulty") {
            "Topic and difficulty are required"
        } else if issues.iter().any(|i| i.field == "questions") {
            "At least one question type must be selected"
        } else {
            "Request validation failed"
        };
        QuizError::InvalidRequest {
            message: message.to_string(),
            issues,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
            request_id: request_id.into(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    pub fn not_found(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, request_id)
    }

    pub fn internal(request_id: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
            request_id,
        )
    }

    pub fn from_quiz_error(err: QuizError, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        match err {
            QuizError::InvalidRequest { message, issues } => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, request_id).with_details(
                    issues
                        .into_iter()
                        .map(|i| ErrorDetail {
                            field: i.field,
                            issue: i.issue,
                        })
                        .collect(),
                )
            }
            QuizError::NotFound(_) => Self::not_found("Quiz not found", request_id),
            QuizError::Storage(err) => {
                tracing::error!(request_id = %request_id, "internal error: {}", err);
                Self::internal(request_id)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let payload = ErrorBody {
            success: false,
            message: self.message,
            code: self.code,
            details: self.details,
            request_id: self.request_id,
        };
        (self.status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400_with_details() {
        let err = QuizError::invalid(vec![ValidationIssue {
            field: "questions".into(),
            issue: "at least one question type must be selected".into(),
        }]);
        let app = AppError::from_quiz_error(err, "req-1");
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.message, "At least one question type must be selected");
        assert_eq!(app.details.len(), 1);
    }

    #[test]
    fn storage_error_hides_detail() {
        let err = QuizError::from(StoreError::Unavailable("disk on fire".into()));
        let app = AppError::from_quiz_error(err, "req-2");
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let app = AppError::from_quiz_error(StoreError::NotFound(4).into(), "req-3");
        assert_eq!(app.status, StatusCode::NOT_FOUND);
        assert_eq!(app.message, "Quiz not found");
    }

    #[test]
    fn generation_failure_names_category() {
        let failure = GenerationFailure {
            category: Category::TrueFalse,
            cause: GenerationCause::Upstream("timeout".into()),
        };
        assert_eq!(
            failure.to_string(),
            "failed to generate bool questions: model call failed: timeout"
        );
    }
}
