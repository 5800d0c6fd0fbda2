//! # Offer Controller
//!
//! Route table for `/offers`. Validation rules live here as plain data
//! next to the registrations that consume them; every registration
//! constructs fresh middleware instances bound to its own parameters.

use std::sync::Arc;

use axum::http::Method;

use crate::domain::aggregate::SortBy;
use crate::domain::comment::CommentProjection;
use crate::domain::offer::{
    City, Convenience, CreateOffer, OfferPatch, OfferProjection, PlaceType, DEFAULT_OFFER_COUNT,
};
use crate::pipeline::middleware::{EnsureExists, ValidateBody, ValidateId};
use crate::pipeline::schema::{BodySchema, FieldKind};
use crate::pipeline::{handler, ApiError, ApiResult, Controller, Envelope, RequestContext, RouteDescriptor};
use crate::services::{CommentService, OfferService};
use crate::store::ExistenceProbe;

const COMPONENT: &str = "OfferController";

fn location_rules() -> BodySchema {
    BodySchema::new()
        .required("latitude", FieldKind::Float { min: -90.0, max: 90.0 })
        .required("longitude", FieldKind::Float { min: -180.0, max: 180.0 })
}

fn create_offer_rules() -> BodySchema {
    BodySchema::new()
        .required("name", FieldKind::Str { min: 10, max: 100 })
        .required("description", FieldKind::Str { min: 20, max: 1024 })
        .required("city", FieldKind::OneOf(City::NAMES))
        .required("previewImage", FieldKind::Str { min: 1, max: 256 })
        .required(
            "placeImages",
            FieldKind::Array {
                item: Box::new(FieldKind::Str { min: 1, max: 256 }),
                min_len: 6,
                max_len: 6,
            },
        )
        .required("isPremium", FieldKind::Bool)
        .required("type", FieldKind::OneOf(PlaceType::NAMES))
        .required("roomsAmount", FieldKind::Int { min: 1, max: 8 })
        .required("guestsAmount", FieldKind::Int { min: 1, max: 10 })
        .required("price", FieldKind::Int { min: 100, max: 100_000 })
        .required(
            "conveniences",
            FieldKind::Array {
                item: Box::new(FieldKind::OneOf(Convenience::NAMES)),
                min_len: 1,
                max_len: Convenience::NAMES.len(),
            },
        )
        .required("authorId", FieldKind::Id)
        .required("location", FieldKind::Object(location_rules()))
}

fn update_offer_rules() -> BodySchema {
    BodySchema::new()
        .optional("name", FieldKind::Str { min: 10, max: 100 })
        .optional("description", FieldKind::Str { min: 20, max: 1024 })
        .optional("city", FieldKind::OneOf(City::NAMES))
        .optional("previewImage", FieldKind::Str { min: 1, max: 256 })
        .optional(
            "placeImages",
            FieldKind::Array {
                item: Box::new(FieldKind::Str { min: 1, max: 256 }),
                min_len: 6,
                max_len: 6,
            },
        )
        .optional("isPremium", FieldKind::Bool)
        .optional("type", FieldKind::OneOf(PlaceType::NAMES))
        .optional("roomsAmount", FieldKind::Int { min: 1, max: 8 })
        .optional("guestsAmount", FieldKind::Int { min: 1, max: 10 })
        .optional("price", FieldKind::Int { min: 100, max: 100_000 })
        .optional(
            "conveniences",
            FieldKind::Array {
                item: Box::new(FieldKind::OneOf(Convenience::NAMES)),
                min_len: 1,
                max_len: Convenience::NAMES.len(),
            },
        )
        .optional("authorId", FieldKind::Id)
        .optional("location", FieldKind::Object(location_rules()))
}

pub fn offer_controller(
    offers: Arc<OfferService>,
    comments: Arc<CommentService>,
    offer_probe: Arc<dyn ExistenceProbe>,
) -> Controller {
    let mut controller = Controller::new(COMPONENT, "/offers");

    {
        let offers = Arc::clone(&offers);
        controller.add_route(RouteDescriptor::new(
            Method::GET,
            "/",
            handler(move |ctx| index(Arc::clone(&offers), ctx)),
        ));
    }

    {
        let offers = Arc::clone(&offers);
        controller.add_route(
            RouteDescriptor::new(
                Method::POST,
                "/",
                handler(move |ctx| create(Arc::clone(&offers), ctx)),
            )
            .with(ValidateBody::new(create_offer_rules())),
        );
    }

    {
        let offers = Arc::clone(&offers);
        controller.add_route(
            RouteDescriptor::new(
                Method::GET,
                "/:offerId",
                handler(move |ctx| show(Arc::clone(&offers), ctx)),
            )
            .with(ValidateId::new("offerId"))
            .with(EnsureExists::new(Arc::clone(&offer_probe), "Offer", "offerId")),
        );
    }

    {
        // Body validation first: an invalid body wins over a malformed id
        let offers = Arc::clone(&offers);
        controller.add_route(
            RouteDescriptor::new(
                Method::PATCH,
                "/:offerId",
                handler(move |ctx| update(Arc::clone(&offers), ctx)),
            )
            .with(ValidateBody::new(update_offer_rules()))
            .with(ValidateId::new("offerId"))
            .with(EnsureExists::new(Arc::clone(&offer_probe), "Offer", "offerId")),
        );
    }

    {
        let offers = Arc::clone(&offers);
        controller.add_route(
            RouteDescriptor::new(
                Method::DELETE,
                "/:offerId",
                handler(move |ctx| delete(Arc::clone(&offers), ctx)),
            )
            .with(ValidateId::new("offerId")),
        );
    }

    {
        let comments = Arc::clone(&comments);
        controller.add_route(
            RouteDescriptor::new(
                Method::GET,
                "/:offerId/comments",
                handler(move |ctx| offer_comments(Arc::clone(&comments), ctx)),
            )
            .with(ValidateId::new("offerId"))
            .with(EnsureExists::new(Arc::clone(&offer_probe), "Offer", "offerId")),
        );
    }

    controller
}

async fn index(offers: Arc<OfferService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let limit = match ctx.query.get("limit") {
        None => DEFAULT_OFFER_COUNT,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::invalid_field("limit", "must be a non-negative integer", COMPONENT)
        })?,
    };
    let sort = match ctx.query.get("sort") {
        None => SortBy::Newest,
        Some(raw) => SortBy::from_query(raw).ok_or_else(|| {
            ApiError::invalid_field("sort", "must be one of: new, popular", COMPONENT)
        })?,
    };

    let views = offers.find(limit, sort, ctx.identity.as_ref()).await?;
    let projections: Vec<OfferProjection> = views.iter().map(OfferProjection::new).collect();
    Envelope::ok(&projections)
}

async fn create(offers: Arc<OfferService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let dto: CreateOffer = ctx.body_as(COMPONENT)?;
    let view = offers.create(dto).await?;
    Envelope::created(&OfferProjection::new(&view))
}

async fn show(offers: Arc<OfferService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("offerId")?;
    let view = offers
        .find_by_id(id, ctx.identity.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Offer", id, COMPONENT))?;
    Envelope::ok(&OfferProjection::new(&view))
}

async fn update(offers: Arc<OfferService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("offerId")?;
    let patch: OfferPatch = ctx.body_as(COMPONENT)?;
    let view = offers
        .update_by_id(id, patch, ctx.identity.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Offer", id, COMPONENT))?;
    Envelope::ok(&OfferProjection::new(&view))
}

async fn delete(offers: Arc<OfferService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("offerId")?;
    offers
        .delete_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Offer", id, COMPONENT))?;
    Ok(Envelope::no_content())
}

async fn offer_comments(comments: Arc<CommentService>, ctx: RequestContext) -> ApiResult<Envelope> {
    let id = ctx.param_id("offerId")?;
    let resolved = comments.find_by_offer(id).await?;
    let projections: Vec<CommentProjection> = resolved
        .iter()
        .map(|(comment, author)| CommentProjection::new(comment, author.as_ref()))
        .collect();
    Envelope::ok(&projections)
}
