//! # Request Pipeline
//!
//! The request-handling core: route registration, ordered middleware
//! composition, typed error dispatch, and the success envelopes. Control
//! flow for every request: match a registered route, run its middleware
//! list strictly in order, run the handler, and hand any raised error to
//! the exception filter chain, which always terminates the request with
//! the uniform error body.

pub mod context;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod route;
pub mod schema;
pub mod server;

pub use context::{Identity, RequestContext};
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, FieldViolation};
pub use filter::FilterChain;
pub use route::{handler, Controller, RouteDescriptor};
pub use server::{mount, MountError, PipelineShared};
