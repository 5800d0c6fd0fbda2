//! # Mount & Dispatch
//!
//! Turns the route registry into an axum router and runs the pipeline for
//! each request: build the context, parse the bearer credential, run the
//! middleware list strictly in order, then the handler. Any failure, sync
//! or async, travels to the filter chain exactly once; success terminates
//! with the handler's envelope. Axum only carries bytes in and responses
//! out.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::Router;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::JwtManager;

use super::context::{Identity, RequestContext};
use super::envelope::Envelope;
use super::error::{ApiError, ApiResult};
use super::filter::FilterChain;
use super::route::{Controller, RouteDescriptor};

const TOKEN_COMPONENT: &str = "TokenParser";

/// Registration faults, reported at startup rather than per request
#[derive(Debug, Clone, Error)]
pub enum MountError {
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: Method, path: String },
    #[error("controller prefix {0} registered twice")]
    PrefixCollision(String),
    #[error("method {0} cannot be routed")]
    UnsupportedMethod(Method),
}

/// Process-wide, immutable-after-startup pipeline state
pub struct PipelineShared {
    pub filters: FilterChain,
    pub tokens: Arc<JwtManager>,
}

fn join_path(prefix: &str, path: &str) -> String {
    if path == "/" {
        prefix.to_string()
    } else {
        format!("{prefix}{path}")
    }
}

/// Mount controllers into a single router. Method+path pairs must be
/// unique and controller prefixes must not collide; both are checked here
/// so a misconfigured registry never starts serving.
pub fn mount(controllers: Vec<Controller>, shared: PipelineShared) -> Result<Router, MountError> {
    let shared = Arc::new(shared);
    let mut router = Router::new();
    let mut prefixes: HashSet<&'static str> = HashSet::new();
    let mut registered: HashSet<(Method, String)> = HashSet::new();

    for controller in controllers {
        if !prefixes.insert(controller.prefix) {
            return Err(MountError::PrefixCollision(controller.prefix.to_string()));
        }
        let prefix = controller.prefix;
        for route in controller.into_routes() {
            let full_path = join_path(prefix, route.path);
            let key = (route.method.clone(), full_path.clone());
            if !registered.insert(key) {
                return Err(MountError::DuplicateRoute {
                    method: route.method.clone(),
                    path: full_path,
                });
            }

            let filter = MethodFilter::try_from(route.method.clone())
                .map_err(|_| MountError::UnsupportedMethod(route.method.clone()))?;
            let route = Arc::new(route);
            let shared = Arc::clone(&shared);
            router = router.route(
                &full_path,
                on(filter, move |req: Request| {
                    let route = Arc::clone(&route);
                    let shared = Arc::clone(&shared);
                    async move { dispatch(&route, &shared, req).await }
                }),
            );
        }
    }

    Ok(router)
}

/// Run one request to completion. This is the single point where the error
/// channel meets the filter chain, so an exception can neither escape nor
/// be serialized twice.
async fn dispatch(route: &RouteDescriptor, shared: &PipelineShared, req: Request) -> Response {
    match run(route, shared, req).await {
        Ok(envelope) => envelope.into_response(),
        Err(error) => shared.filters.dispatch(error),
    }
}

async fn run(route: &RouteDescriptor, shared: &PipelineShared, req: Request) -> ApiResult<Envelope> {
    let mut ctx = RequestContext::from_request(req).await?;

    // Process-wide identity parsing: a present credential must verify; a
    // missing one attaches nothing and is not an error.
    if let Some(token) = ctx.bearer.take() {
        ctx.identity = Some(parse_identity(shared, &token)?);
    }

    for middleware in &route.middlewares {
        middleware.gate(&mut ctx).await?;
    }

    route.handler.call(ctx).await
}

fn parse_identity(shared: &PipelineShared, token: &str) -> ApiResult<Identity> {
    let claims = shared
        .tokens
        .verify(token)
        .map_err(|error| ApiError::auth(error.to_string(), TOKEN_COMPONENT))?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::auth("Malformed token", TOKEN_COMPONENT))?;
    Ok(Identity {
        id,
        email: claims.email,
    })
}
