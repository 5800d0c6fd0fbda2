//! # Request Context
//!
//! Per-request state threaded through the middleware pipeline. Each request
//! owns its own context; nothing here is shared between tasks. Middlewares
//! mutate it only in declared ways: a validated body replaces the raw one,
//! an identity or a stored upload gets attached.

use std::collections::HashMap;

use axum::body::{to_bytes, Bytes};
use axum::extract::{FromRequestParts, Path, Query, Request};
use axum::http::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::upload::StoredFile;

use super::error::{ApiError, ApiResult, FieldViolation};

/// Largest request body the pipeline will buffer (covers avatar uploads)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const COMPONENT: &str = "RequestContext";

/// The authenticated caller, attached by process-wide token parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Request-scoped state. Owned by exactly one request task.
#[derive(Debug)]
pub struct RequestContext {
    /// Path parameters by name
    pub params: HashMap<String, String>,
    /// Query parameters by name
    pub query: HashMap<String, String>,
    /// JSON body; replaced by the validated/coerced body after ValidateBody
    pub body: Option<Value>,
    /// Raw body bytes, kept for non-JSON payloads such as uploads
    pub raw_body: Bytes,
    /// Declared media type, lowercased, parameters stripped
    pub content_type: Option<String>,
    /// Bearer credential, if the request carried one
    pub bearer: Option<String>,
    /// Attached by token parsing when the credential verifies
    pub identity: Option<Identity>,
    /// Attached by AcceptUpload after the file is persisted
    pub upload: Option<StoredFile>,
}

impl RequestContext {
    /// An empty context, useful for exercising middlewares directly
    pub fn empty() -> Self {
        Self {
            params: HashMap::new(),
            query: HashMap::new(),
            body: None,
            raw_body: Bytes::new(),
            content_type: None,
            bearer: None,
            identity: None,
            upload: None,
        }
    }

    /// Build a context from an inbound request, buffering the body.
    ///
    /// A JSON-declared body that fails to parse is a validation failure;
    /// other body types are kept raw for the upload path.
    pub async fn from_request(req: Request) -> ApiResult<Self> {
        let (mut parts, body) = req.into_parts();

        let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await
        {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };

        let query = match Query::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await
        {
            Ok(Query(query)) => query,
            Err(_) => {
                return Err(ApiError::invalid_field(
                    "query",
                    "query string is malformed",
                    COMPONENT,
                ))
            }
        };

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase());

        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let raw_body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| {
            ApiError::http(
                StatusCode::PAYLOAD_TOO_LARGE,
                "request body could not be read",
                COMPONENT,
            )
        })?;

        let body = if content_type.as_deref() == Some("application/json") && !raw_body.is_empty() {
            let parsed = serde_json::from_slice(&raw_body).map_err(|_| {
                ApiError::validation(
                    vec![FieldViolation::new("body", "must be valid JSON")],
                    COMPONENT,
                )
            })?;
            Some(parsed)
        } else {
            None
        };

        Ok(Self {
            params,
            query,
            body,
            raw_body,
            content_type,
            bearer,
            identity: None,
            upload: None,
        })
    }

    /// A named path parameter. Missing parameters are a route-declaration
    /// fault, not client input, so they map to the 500 category.
    pub fn param(&self, name: &str) -> ApiResult<&str> {
        self.params.get(name).map(String::as_str).ok_or_else(|| {
            ApiError::unclassified(format!("route declares no :{name} parameter"), COMPONENT)
        })
    }

    /// A named path parameter parsed as a store id
    pub fn param_id(&self, name: &str) -> ApiResult<Uuid> {
        let raw = self.param(name)?;
        Uuid::parse_str(raw)
            .map_err(|_| ApiError::invalid_field(name, "must be a valid resource id", COMPONENT))
    }

    /// Deserialize the (validated) body into a typed DTO
    pub fn body_as<T: DeserializeOwned>(&self, component: &str) -> ApiResult<T> {
        let body = self.body.as_ref().ok_or_else(|| {
            ApiError::invalid_field("body", "request body is required", component)
        })?;
        serde_json::from_value(body.clone()).map_err(|error| {
            ApiError::unclassified(format!("validated body failed to decode: {error}"), component)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_id_rejects_malformed_ids() {
        let mut ctx = RequestContext::empty();
        ctx.params
            .insert("offerId".to_string(), "not-a-uuid".to_string());
        let error = ctx.param_id("offerId").unwrap_err();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_param_is_a_route_fault() {
        let ctx = RequestContext::empty();
        let error = ctx.param("offerId").unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_as_decodes_validated_body() {
        #[derive(serde::Deserialize)]
        struct Dto {
            name: String,
        }
        let mut ctx = RequestContext::empty();
        ctx.body = Some(json!({"name": "Seaside loft"}));
        let dto: Dto = ctx.body_as("Test").unwrap();
        assert_eq!(dto.name, "Seaside loft");
    }
}
