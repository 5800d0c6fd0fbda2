//! # Pipeline Errors
//!
//! The closed failure taxonomy for the request pipeline. Every failure a
//! middleware, handler, or service can raise is one of these categories;
//! the filter chain in [`super::filter`] is the single place they are
//! turned into responses.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Result type for pipeline operations
pub type ApiResult<T> = Result<T, ApiError>;

/// A single violated field constraint, reported by body validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Typed request failure. Immutable once raised; carries the originating
/// component so the uniform error body can name it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Missing, invalid, or expired credential (401)
    #[error("{message}")]
    Auth { message: String, component: String },

    /// Malformed or missing input; one message per violated field (400)
    #[error("{}", join_violations(violations))]
    Validation {
        violations: Vec<FieldViolation>,
        component: String,
    },

    /// Explicit domain condition with its own status (404, 409, ...)
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        component: String,
    },

    /// Anything that does not fit the categories above (500)
    #[error("{message}")]
    Unclassified { message: String, component: String },
}

fn join_violations(violations: &[FieldViolation]) -> String {
    if violations.is_empty() {
        return "Validation failed".to_string();
    }
    let joined = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("Validation failed: {joined}")
}

impl ApiError {
    pub fn auth(message: impl Into<String>, component: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            component: component.into(),
        }
    }

    pub fn validation(violations: Vec<FieldViolation>, component: impl Into<String>) -> Self {
        Self::Validation {
            violations,
            component: component.into(),
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn invalid_field(
        field: impl Into<String>,
        message: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self::validation(vec![FieldViolation::new(field, message)], component)
    }

    pub fn http(
        status: StatusCode,
        message: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self::Http {
            status,
            message: message.into(),
            component: component.into(),
        }
    }

    pub fn not_found(
        kind: &str,
        id: impl std::fmt::Display,
        component: impl Into<String>,
    ) -> Self {
        Self::http(
            StatusCode::NOT_FOUND,
            format!("{kind} with id {id} not found"),
            component,
        )
    }

    pub fn unclassified(message: impl Into<String>, component: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            component: component.into(),
        }
    }

    /// HTTP status for this error's category
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth { .. } => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Http { status, .. } => *status,
            Self::Unclassified { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The component that raised this error
    pub fn component(&self) -> &str {
        match self {
            Self::Auth { component, .. }
            | Self::Validation { component, .. }
            | Self::Http { component, .. }
            | Self::Unclassified { component, .. } => component,
        }
    }
}

/// The uniform error body: identical in shape regardless of which filter
/// produced it. Internal detail never leaves through here.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub component: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(error: &ApiError) -> Self {
        Self {
            status: error.status_code().as_u16(),
            message: error.to_string(),
            component: error.component().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_mapping() {
        assert_eq!(
            ApiError::auth("no token", "RequireAuth").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::validation(vec![], "ValidateBody").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::http(StatusCode::CONFLICT, "duplicate", "UserController").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::unclassified("boom", "Store").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_carries_every_violation() {
        let error = ApiError::validation(
            vec![
                FieldViolation::new("name", "must be a string of 10..100 characters"),
                FieldViolation::new("price", "must be an integer in 100..100000"),
            ],
            "ValidateBody",
        );
        let message = error.to_string();
        assert!(message.contains("name:"));
        assert!(message.contains("price:"));
    }

    #[test]
    fn test_body_shape_is_uniform() {
        let body = ErrorBody::from(&ApiError::not_found("Offer", "abc", "EnsureExists"));
        assert_eq!(body.status, 404);
        assert_eq!(body.component, "EnsureExists");
        assert!(body.message.contains("Offer"));
    }
}
