//! # Route Registry
//!
//! Route descriptors and controllers. A descriptor binds method + path to a
//! handler plus an ordered middleware list; a controller accumulates
//! descriptors at construction and owns them exclusively for the process
//! lifetime. Uniqueness and prefix rules are enforced when the registry is
//! mounted (see [`super::server`]).

use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;

use super::context::RequestContext;
use super::envelope::Envelope;
use super::error::ApiResult;
use super::middleware::Middleware;

/// A route's business logic: runs only after every middleware passed
pub trait Handler: Send + Sync {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, ApiResult<Envelope>>;
}

struct FnHandler<F>(F);

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<Envelope>> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, ApiResult<Envelope>> {
        Box::pin((self.0)(ctx))
    }
}

/// Wrap an async function or closure as a boxed handler
pub fn handler<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Envelope>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// One registered route. Immutable after registration; the middleware
/// instances are owned by the descriptor that references them.
pub struct RouteDescriptor {
    pub method: Method,
    pub path: &'static str,
    pub middlewares: Vec<Box<dyn Middleware>>,
    pub handler: Arc<dyn Handler>,
}

impl RouteDescriptor {
    pub fn new(method: Method, path: &'static str, handler: Arc<dyn Handler>) -> Self {
        Self {
            method,
            path,
            middlewares: Vec::new(),
            handler,
        }
    }

    /// Append a middleware; gates run strictly in the order added
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }
}

/// A resource's route table, mounted at a fixed path prefix
pub struct Controller {
    pub name: &'static str,
    pub prefix: &'static str,
    routes: Vec<RouteDescriptor>,
}

impl Controller {
    pub fn new(name: &'static str, prefix: &'static str) -> Self {
        tracing::info!(controller = name, prefix, "registering routes");
        Self {
            name,
            prefix,
            routes: Vec::new(),
        }
    }

    pub fn add_route(&mut self, route: RouteDescriptor) {
        tracing::debug!(
            controller = self.name,
            method = %route.method,
            path = route.path,
            middlewares = route.middlewares.len(),
            "route added"
        );
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub(crate) fn into_routes(self) -> Vec<RouteDescriptor> {
        self.routes
    }
}
