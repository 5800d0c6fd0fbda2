//! # Exception Filter Chain
//!
//! Ordered dispatch of typed errors to response-producing filters. Each
//! filter owns exactly one category: it either handles a match and
//! terminates the request with the uniform error body, or passes the error
//! on unchanged. The chain always ends in a catch-all, so every failed
//! request terminates with a response.
//!
//! This is also the single logging point for request failures; stack detail
//! goes to the log, never into the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::error::{ApiError, ErrorBody};

/// One entry in the chain, bound to a single error category
pub trait ExceptionFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Handle a matching error, or give it back untouched
    fn catch(&self, error: ApiError) -> Result<Response, ApiError>;
}

fn respond(error: &ApiError) -> Response {
    let body = ErrorBody::from(error);
    (error.status_code(), Json(body)).into_response()
}

/// Handles `Auth` (401)
pub struct AuthExceptionFilter;

impl ExceptionFilter for AuthExceptionFilter {
    fn name(&self) -> &'static str {
        "AuthExceptionFilter"
    }

    fn catch(&self, error: ApiError) -> Result<Response, ApiError> {
        match error {
            ApiError::Auth { .. } => {
                tracing::warn!(component = error.component(), %error, "authentication failed");
                Ok(respond(&error))
            }
            other => Err(other),
        }
    }
}

/// Handles `Validation` (400), logging every violated field
pub struct ValidationExceptionFilter;

impl ExceptionFilter for ValidationExceptionFilter {
    fn name(&self) -> &'static str {
        "ValidationExceptionFilter"
    }

    fn catch(&self, error: ApiError) -> Result<Response, ApiError> {
        match &error {
            ApiError::Validation { violations, component } => {
                for violation in violations {
                    tracing::warn!(component, %violation, "input rejected");
                }
                Ok(respond(&error))
            }
            _ => Err(error),
        }
    }
}

/// Handles `Http`: explicit domain conditions carrying their own status
pub struct HttpExceptionFilter;

impl ExceptionFilter for HttpExceptionFilter {
    fn name(&self) -> &'static str {
        "HttpExceptionFilter"
    }

    fn catch(&self, error: ApiError) -> Result<Response, ApiError> {
        match error {
            ApiError::Http { .. } => {
                tracing::warn!(
                    component = error.component(),
                    status = error.status_code().as_u16(),
                    %error,
                    "request rejected"
                );
                Ok(respond(&error))
            }
            other => Err(other),
        }
    }
}

/// The mandatory tail of the chain: handles anything that reaches it,
/// mapping unclassified faults to a generic 500 body.
pub struct CatchAllExceptionFilter;

impl CatchAllExceptionFilter {
    fn catch_all(&self, error: &ApiError) -> Response {
        tracing::error!(component = error.component(), %error, "unhandled failure");
        if matches!(error, ApiError::Unclassified { .. }) {
            // Internal detail stays in the log
            let body = ErrorBody {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: "Internal server error".to_string(),
                component: error.component().to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        } else {
            respond(error)
        }
    }
}

/// The ordered chain. Specific categories run before the catch-all; the
/// catch-all is a separate mandatory field so dispatch is total by
/// construction.
pub struct FilterChain {
    filters: Vec<Box<dyn ExceptionFilter>>,
    fallback: CatchAllExceptionFilter,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn ExceptionFilter>>) -> Self {
        Self {
            filters,
            fallback: CatchAllExceptionFilter,
        }
    }

    /// The production ordering: auth, validation, http, then the catch-all
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(AuthExceptionFilter),
            Box::new(ValidationExceptionFilter),
            Box::new(HttpExceptionFilter),
        ])
    }

    /// Serialize an error into its response. Exactly one filter handles it.
    pub fn dispatch(&self, error: ApiError) -> Response {
        let mut current = error;
        for filter in &self.filters {
            match filter.catch(current) {
                Ok(response) => return response,
                Err(unhandled) => current = unhandled,
            }
        }
        self.fallback.catch_all(&current)
    }
}
