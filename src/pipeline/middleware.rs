//! # Middleware Primitives
//!
//! Independent request-gating steps. Each primitive is polymorphic over a
//! single capability: gate the request, then pass or raise exactly one
//! typed error. A primitive never produces a response itself; the filter
//! chain owns serialization. Fresh instances are constructed per route
//! registration, bound to their own parameters, so no middleware state is
//! shared across routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::store::ExistenceProbe;
use crate::upload::{FileSink, UploadPolicy};

use super::context::RequestContext;
use super::error::{ApiError, ApiResult};
use super::schema::BodySchema;

/// A composable request gate
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()>;
}

/// Validates the JSON body against a constraint table. On success the
/// coerced, allow-listed body replaces the raw one for downstream use.
pub struct ValidateBody {
    schema: BodySchema,
}

impl ValidateBody {
    pub const COMPONENT: &'static str = "ValidateBody";

    pub fn new(schema: BodySchema) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl Middleware for ValidateBody {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()> {
        let Some(body) = &ctx.body else {
            return Err(ApiError::invalid_field(
                "body",
                "request body is required",
                Self::COMPONENT,
            ));
        };
        let validated = self
            .schema
            .validate(body)
            .map_err(|violations| ApiError::validation(violations, Self::COMPONENT))?;
        ctx.body = Some(validated);
        Ok(())
    }
}

/// Checks a named path parameter against the store's id grammar. Ordered
/// before any existence probe so malformed ids never reach the data layer.
pub struct ValidateId {
    param: &'static str,
}

impl ValidateId {
    pub const COMPONENT: &'static str = "ValidateId";

    pub fn new(param: &'static str) -> Self {
        Self { param }
    }
}

#[async_trait]
impl Middleware for ValidateId {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()> {
        let raw = ctx.param(self.param)?;
        Uuid::parse_str(raw).map_err(|_| {
            ApiError::invalid_field(self.param, "must be a valid resource id", Self::COMPONENT)
        })?;
        Ok(())
    }
}

/// Fails with a 404 when the referenced document does not exist. Suspends
/// on the store call; the probe never raises for a legitimate "not found".
pub struct EnsureExists {
    probe: Arc<dyn ExistenceProbe>,
    kind: &'static str,
    param: &'static str,
}

impl EnsureExists {
    pub const COMPONENT: &'static str = "EnsureExists";

    pub fn new(probe: Arc<dyn ExistenceProbe>, kind: &'static str, param: &'static str) -> Self {
        Self { probe, kind, param }
    }
}

#[async_trait]
impl Middleware for EnsureExists {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()> {
        let id = ctx.param_id(self.param)?;
        if self.probe.exists(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found(self.kind, id, Self::COMPONENT))
        }
    }
}

/// Gates an incoming file on its declared media type, then persists it.
/// Rejection happens before any byte reaches the sink; acceptance and
/// persistence are not separated.
pub struct AcceptUpload {
    policy: UploadPolicy,
    sink: Arc<dyn FileSink>,
}

impl AcceptUpload {
    pub const COMPONENT: &'static str = "AcceptUpload";

    pub fn new(policy: UploadPolicy, sink: Arc<dyn FileSink>) -> Self {
        Self { policy, sink }
    }
}

#[async_trait]
impl Middleware for AcceptUpload {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()> {
        let media_type = ctx.content_type.clone().ok_or_else(|| {
            ApiError::http(
                StatusCode::BAD_REQUEST,
                "upload requires a Content-Type header",
                Self::COMPONENT,
            )
        })?;

        self.policy.accept(&media_type).map_err(|allowed| {
            ApiError::http(
                StatusCode::BAD_REQUEST,
                format!("only {} uploads are accepted", allowed.join(", ")),
                Self::COMPONENT,
            )
        })?;

        if ctx.raw_body.is_empty() {
            return Err(ApiError::http(
                StatusCode::BAD_REQUEST,
                "upload body is empty",
                Self::COMPONENT,
            ));
        }

        let stored = self
            .sink
            .store(ctx.raw_body.clone(), &media_type)
            .await
            .map_err(|error| ApiError::unclassified(error.to_string(), Self::COMPONENT))?;
        ctx.upload = Some(stored);
        Ok(())
    }
}

/// Requires a previously-attached identity context. Token verification is
/// process-wide and happens earlier; this gate only checks presence.
pub struct RequireAuth;

impl RequireAuth {
    pub const COMPONENT: &'static str = "RequireAuth";
}

#[async_trait]
impl Middleware for RequireAuth {
    async fn gate(&self, ctx: &mut RequestContext) -> ApiResult<()> {
        if ctx.identity.is_some() {
            Ok(())
        } else {
            Err(ApiError::auth("Unauthorized", Self::COMPONENT))
        }
    }
}
