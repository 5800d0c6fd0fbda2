//! # Store Collaborator
//!
//! Repository interfaces for the document store. The pipeline treats
//! persistence as an external collaborator with one contract: a legitimate
//! "not found" is `None`/`false`, never an error; errors mean genuine
//! store faults and surface as the 500 category.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::offer::{Offer, OfferPatch};
use crate::domain::user::{User, UserPatch};
use crate::pipeline::error::ApiError;

pub mod memory;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Genuine store faults only; never raised for a missing document
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("store i/o fault: {0}")]
    Io(String),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::unclassified(error.to_string(), "Store")
    }
}

/// The existence lookup consumed by the EnsureExists middleware
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    async fn exists(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait OfferRepository: ExistenceProbe {
    async fn create(&self, offer: Offer) -> StoreResult<Offer>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Offer>>;
    async fn update_by_id(&self, id: Uuid, patch: &OfferPatch) -> StoreResult<Option<Offer>>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Offer>>;
    async fn all(&self) -> StoreResult<Vec<Offer>>;
}

#[async_trait]
pub trait UserRepository: ExistenceProbe {
    async fn create(&self, user: User) -> StoreResult<User>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_by_id(&self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> StoreResult<Comment>;
    async fn find_by_offer(&self, offer_id: Uuid) -> StoreResult<Vec<Comment>>;
}
