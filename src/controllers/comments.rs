//! # Comment Controller
//!
//! Route table for `/comments`. Reading comments lives under the offer
//! routes; posting one requires a session.

use std::sync::Arc;

use axum::http::Method;

use crate::domain::comment::{CommentProjection, CreateComment};
use crate::pipeline::middleware::{RequireAuth, ValidateBody};
use crate::pipeline::schema::{BodySchema, FieldKind};
use crate::pipeline::{
    handler, ApiError, ApiResult, Controller, Envelope, RequestContext, RouteDescriptor,
};
use crate::services::CommentService;

const COMPONENT: &str = "CommentController";

fn create_comment_rules() -> BodySchema {
    BodySchema::new()
        .required("text", FieldKind::Str { min: 5, max: 1024 })
        .required("rating", FieldKind::Int { min: 1, max: 5 })
        .required("offerId", FieldKind::Id)
}

pub fn comment_controller(comments: Arc<CommentService>) -> Controller {
    let mut controller = Controller::new(COMPONENT, "/comments");

    {
        let comments = Arc::clone(&comments);
        controller.add_route(
            RouteDescriptor::new(
                Method::POST,
                "/",
                handler(move |ctx| create(Arc::clone(&comments), ctx)),
            )
            .with(RequireAuth)
            .with(ValidateBody::new(create_comment_rules())),
        );
    }

    controller
}

async fn create(comments: Arc<CommentService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let identity = ctx
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::auth("Unauthorized", COMPONENT))?;
    let dto: CreateComment = ctx.body_as(COMPONENT)?;
    let (comment, author) = comments.create(dto, identity).await?;
    Envelope::created(&CommentProjection::new(&comment, author.as_ref()))
}
