//! # Response Envelope
//!
//! The three success shapes a handler may terminate with. A handler either
//! returns exactly one envelope or raises exactly one error, never both.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error::{ApiError, ApiResult};

const COMPONENT: &str = "Envelope";

/// Successful completion of a handler
#[derive(Debug, Clone)]
pub enum Envelope {
    /// 200 with a serialized projection or list of projections
    Ok(Value),
    /// 201 with the projection of the newly created resource
    Created(Value),
    /// 204, empty body
    NoContent,
}

impl Envelope {
    pub fn ok<T: Serialize>(body: &T) -> ApiResult<Self> {
        Ok(Self::Ok(to_value(body)?))
    }

    pub fn created<T: Serialize>(body: &T) -> ApiResult<Self> {
        Ok(Self::Created(to_value(body)?))
    }

    pub const fn no_content() -> Self {
        Self::NoContent
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Ok(_) => StatusCode::OK,
            Self::Created(_) => StatusCode::CREATED,
            Self::NoContent => StatusCode::NO_CONTENT,
        }
    }
}

fn to_value<T: Serialize>(body: &T) -> ApiResult<Value> {
    serde_json::to_value(body)
        .map_err(|error| ApiError::unclassified(format!("response serialization failed: {error}"), COMPONENT))
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_statuses() {
        assert_eq!(Envelope::ok(&json!({})).unwrap().status(), StatusCode::OK);
        assert_eq!(
            Envelope::created(&json!({})).unwrap().status(),
            StatusCode::CREATED
        );
        assert_eq!(Envelope::no_content().status(), StatusCode::NO_CONTENT);
    }
}
