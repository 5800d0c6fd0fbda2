//! # Offer Service
//!
//! Business logic for listings. Reads always reassemble the full view:
//! entity, resolved author, recomputed derived fields, and the viewer's
//! favourite flag. Aggregation runs before sorting and truncation because
//! the popular order sorts on a computed field.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use uuid::Uuid;

use crate::domain::aggregate::{sort_and_truncate, DerivedFields, SortBy};
use crate::domain::offer::{CreateOffer, Offer, OfferPatch, OfferView};
use crate::pipeline::{ApiError, ApiResult, Identity};
use crate::store::{CommentRepository, OfferRepository, UserRepository};

const COMPONENT: &str = "OfferService";

pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl OfferService {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            offers,
            users,
            comments,
        }
    }

    /// Create a listing. The referenced author must exist; a dangling
    /// reference is a modeled 400, not a store fault.
    pub async fn create(&self, dto: CreateOffer) -> ApiResult<OfferView> {
        let author = self.users.find_by_id(dto.author_id).await?;
        let Some(author) = author else {
            return Err(ApiError::http(
                StatusCode::BAD_REQUEST,
                format!("User with id {} not exists", dto.author_id),
                COMPONENT,
            ));
        };

        let offer = self.offers.create(Offer::from_create(dto)).await?;
        tracing::info!(offer = %offer.id, name = %offer.name, "new offer created");

        Ok(OfferView {
            offer,
            author: Some(author),
            derived: DerivedFields::default(),
            is_favorite: false,
        })
    }

    /// List views, aggregated first, then ordered and capped
    pub async fn find(
        &self,
        limit: usize,
        sort: SortBy,
        viewer: Option<&Identity>,
    ) -> ApiResult<Vec<OfferView>> {
        let favorites = self.viewer_favorites(viewer).await?;

        let mut views = Vec::new();
        for offer in self.offers.all().await? {
            views.push(self.assemble(offer, &favorites).await?);
        }

        sort_and_truncate(&mut views, sort, limit);
        Ok(views)
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        viewer: Option<&Identity>,
    ) -> ApiResult<Option<OfferView>> {
        let Some(offer) = self.offers.find_by_id(id).await? else {
            return Ok(None);
        };
        let favorites = self.viewer_favorites(viewer).await?;
        Ok(Some(self.assemble(offer, &favorites).await?))
    }

    /// Patch a listing. A patched author reference is validated the same
    /// way as on creation.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        patch: OfferPatch,
        viewer: Option<&Identity>,
    ) -> ApiResult<Option<OfferView>> {
        if let Some(author_id) = patch.author_id {
            if self.users.find_by_id(author_id).await?.is_none() {
                return Err(ApiError::http(
                    StatusCode::BAD_REQUEST,
                    format!("Author with id {author_id} not exists"),
                    COMPONENT,
                ));
            }
        }

        let Some(offer) = self.offers.update_by_id(id, &patch).await? else {
            return Ok(None);
        };
        let favorites = self.viewer_favorites(viewer).await?;
        Ok(Some(self.assemble(offer, &favorites).await?))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> ApiResult<Option<Offer>> {
        let deleted = self.offers.delete_by_id(id).await?;
        if let Some(offer) = &deleted {
            tracing::info!(offer = %offer.id, "offer deleted");
        }
        Ok(deleted)
    }

    async fn viewer_favorites(&self, viewer: Option<&Identity>) -> ApiResult<HashSet<Uuid>> {
        let Some(viewer) = viewer else {
            return Ok(HashSet::new());
        };
        let user = self.users.find_by_id(viewer.id).await?;
        Ok(user
            .map(|user| user.favorites.into_iter().collect())
            .unwrap_or_default())
    }

    async fn assemble(&self, offer: Offer, favorites: &HashSet<Uuid>) -> ApiResult<OfferView> {
        let comments = self.comments.find_by_offer(offer.id).await?;
        let author = self.users.find_by_id(offer.author_id).await?;
        Ok(OfferView {
            derived: DerivedFields::from_comments(&comments),
            is_favorite: favorites.contains(&offer.id),
            offer,
            author,
        })
    }
}
