//! # User Controller
//!
//! Route table for `/users`: registration, session, profile patching,
//! avatar upload and the favorites toggle.

use std::sync::Arc;

use axum::http::Method;

use crate::domain::user::{
    LoggedUserProjection, LoginUser, RegisterUser, SetFavorite, UserPatch, UserKind,
    UserProjection,
};
use crate::pipeline::middleware::{
    AcceptUpload, EnsureExists, RequireAuth, ValidateBody, ValidateId,
};
use crate::pipeline::schema::{BodySchema, FieldKind};
use crate::pipeline::{
    handler, ApiError, ApiResult, Controller, Envelope, RequestContext, RouteDescriptor,
};
use crate::services::UserService;
use crate::store::ExistenceProbe;
use crate::upload::{FileSink, UploadPolicy};

const COMPONENT: &str = "UserController";

fn register_rules() -> BodySchema {
    BodySchema::new()
        .required("name", FieldKind::Str { min: 1, max: 15 })
        .required("email", FieldKind::Email)
        .optional("avatarUrl", FieldKind::Str { min: 1, max: 256 })
        .required("type", FieldKind::OneOf(UserKind::NAMES))
        .required("password", FieldKind::Str { min: 6, max: 12 })
}

fn login_rules() -> BodySchema {
    BodySchema::new()
        .required("email", FieldKind::Email)
        .required("password", FieldKind::Str { min: 6, max: 12 })
}

fn update_user_rules() -> BodySchema {
    BodySchema::new()
        .optional("name", FieldKind::Str { min: 1, max: 15 })
        .optional("avatarUrl", FieldKind::Str { min: 1, max: 256 })
        .optional("type", FieldKind::OneOf(UserKind::NAMES))
}

fn set_favorite_rules() -> BodySchema {
    BodySchema::new()
        .required("offerId", FieldKind::Id)
        .required("isFavorite", FieldKind::Bool)
}

pub fn user_controller(
    users: Arc<UserService>,
    user_probe: Arc<dyn ExistenceProbe>,
    avatar_sink: Arc<dyn FileSink>,
) -> Controller {
    let mut controller = Controller::new(COMPONENT, "/users");

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::POST,
                "/register",
                handler(move |ctx| register(Arc::clone(&users), ctx)),
            )
            .with(ValidateBody::new(register_rules())),
        );
    }

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::POST,
                "/login",
                handler(move |ctx| login(Arc::clone(&users), ctx)),
            )
            .with(ValidateBody::new(login_rules())),
        );
    }

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::GET,
                "/login",
                handler(move |ctx| check_auth(Arc::clone(&users), ctx)),
            )
            .with(RequireAuth),
        );
    }

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::PATCH,
                "/:userId",
                handler(move |ctx| update(Arc::clone(&users), ctx)),
            )
            .with(ValidateBody::new(update_user_rules()))
            .with(ValidateId::new("userId"))
            .with(EnsureExists::new(Arc::clone(&user_probe), "User", "userId")),
        );
    }

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::PATCH,
                "/:userId/avatar",
                handler(move |ctx| upload_avatar(Arc::clone(&users), ctx)),
            )
            .with(ValidateId::new("userId"))
            .with(EnsureExists::new(Arc::clone(&user_probe), "User", "userId"))
            .with(AcceptUpload::new(UploadPolicy::images(), avatar_sink)),
        );
    }

    {
        let users = Arc::clone(&users);
        controller.add_route(
            RouteDescriptor::new(
                Method::PUT,
                "/favorites",
                handler(move |ctx| set_favorite(Arc::clone(&users), ctx)),
            )
            .with(RequireAuth)
            .with(ValidateBody::new(set_favorite_rules())),
        );
    }

    controller
}

async fn register(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let dto: RegisterUser = ctx.body_as(COMPONENT)?;
    let user = users.register(dto).await?;
    Envelope::created(&UserProjection::from(&user))
}

async fn login(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let dto: LoginUser = ctx.body_as(COMPONENT)?;
    let (user, token) = users.login(dto).await?;
    Envelope::ok(&LoggedUserProjection {
        email: user.email,
        token,
    })
}

async fn check_auth(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let identity = ctx
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::auth("Unauthorized", COMPONENT))?;
    let user = users
        .find_by_email(&identity.email)
        .await?
        .ok_or_else(|| ApiError::auth("Unauthorized", COMPONENT))?;
    Envelope::ok(&UserProjection::from(&user))
}

async fn update(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("userId")?;
    let patch: UserPatch = ctx.body_as(COMPONENT)?;
    let user = users
        .update_by_id(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id, COMPONENT))?;
    Envelope::ok(&UserProjection::from(&user))
}

async fn upload_avatar(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("userId")?;
    let stored = ctx
        .upload
        .as_ref()
        .ok_or_else(|| ApiError::unclassified("upload middleware did not run", COMPONENT))?;

    let patch = UserPatch {
        avatar_url: Some(stored.path.clone()),
        ..UserPatch::default()
    };
    users
        .update_by_id(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id, COMPONENT))?;

    Envelope::created(&serde_json::json!({ "filepath": stored.path }))
}

async fn set_favorite(users: Arc<UserService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let identity = ctx
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::auth("Unauthorized", COMPONENT))?;
    let dto: SetFavorite = ctx.body_as(COMPONENT)?;
    users
        .set_favorite(identity, dto.offer_id, dto.is_favorite)
        .await?;
    Ok(Envelope::no_content())
}
