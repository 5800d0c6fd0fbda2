//! # In-Memory Store
//!
//! Reference repository implementations backing the demo binary and the
//! tests. Concurrency control is the store's own: one RwLock per
//! collection, no client-side locking anywhere else.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::offer::{Offer, OfferPatch};
use crate::domain::user::{User, UserPatch};

use super::{
    CommentRepository, ExistenceProbe, OfferRepository, StoreError, StoreResult, UserRepository,
};

fn poisoned() -> StoreError {
    StoreError::Io("collection lock poisoned".to_string())
}

/// Offers keyed by id
#[derive(Default)]
pub struct MemoryOfferRepository {
    offers: RwLock<HashMap<Uuid, Offer>>,
}

impl MemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExistenceProbe for MemoryOfferRepository {
    async fn exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.offers.read().map_err(|_| poisoned())?.contains_key(&id))
    }
}

#[async_trait]
impl OfferRepository for MemoryOfferRepository {
    async fn create(&self, offer: Offer) -> StoreResult<Offer> {
        self.offers
            .write()
            .map_err(|_| poisoned())?
            .insert(offer.id, offer.clone());
        Ok(offer)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Offer>> {
        Ok(self.offers.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn update_by_id(&self, id: Uuid, patch: &OfferPatch) -> StoreResult<Option<Offer>> {
        let mut offers = self.offers.write().map_err(|_| poisoned())?;
        Ok(offers.get_mut(&id).map(|offer| {
            offer.apply(patch);
            offer.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Offer>> {
        Ok(self.offers.write().map_err(|_| poisoned())?.remove(&id))
    }

    async fn all(&self) -> StoreResult<Vec<Offer>> {
        Ok(self
            .offers
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }
}

/// Users keyed by id; email uniqueness is enforced by the service layer
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExistenceProbe for MemoryUserRepository {
    async fn exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.read().map_err(|_| poisoned())?.contains_key(&id))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: User) -> StoreResult<User> {
        self.users
            .write()
            .map_err(|_| poisoned())?
            .insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .map_err(|_| poisoned())?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn update_by_id(&self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<User>> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.get_mut(&id).map(|user| {
            user.apply(patch);
            user.clone()
        }))
    }
}

/// Comments keyed by id, scanned by offer
#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, comment: Comment) -> StoreResult<Comment> {
        self.comments
            .write()
            .map_err(|_| poisoned())?
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_offer(&self, offer_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(self
            .comments
            .read()
            .map_err(|_| poisoned())?
            .values()
            .filter(|comment| comment.offer_id == offer_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::offer::{City, Convenience, Coordinates, CreateOffer, PlaceType};

    fn sample_offer() -> Offer {
        Offer::from_create(CreateOffer {
            name: "Tiny room near the station".to_string(),
            description: "Small but well located, great for one".to_string(),
            city: City::Cologne,
            preview_image: "p.png".to_string(),
            place_images: vec!["i.png".to_string(); 6],
            is_premium: false,
            place_type: PlaceType::Room,
            rooms: 1,
            guests: 1,
            price: 120,
            conveniences: vec![Convenience::Towels],
            author_id: Uuid::new_v4(),
            location: Coordinates {
                latitude: 50.94,
                longitude: 6.96,
            },
        })
    }

    #[tokio::test]
    async fn test_offer_lifecycle() {
        let repo = MemoryOfferRepository::new();
        let offer = repo.create(sample_offer()).await.unwrap();

        assert!(repo.exists(offer.id).await.unwrap());

        let patched = repo
            .update_by_id(
                offer.id,
                &OfferPatch {
                    price: Some(150),
                    ..OfferPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.price, 150);

        assert!(repo.delete_by_id(offer.id).await.unwrap().is_some());
        assert!(repo.delete_by_id(offer.id).await.unwrap().is_none());
        assert!(!repo.exists(offer.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_documents_are_none_not_errors() {
        let repo = MemoryOfferRepository::new();
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo
            .update_by_id(Uuid::new_v4(), &OfferPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_comments_filter_by_offer() {
        let repo = MemoryCommentRepository::new();
        let offer_id = Uuid::new_v4();
        for rating in [2, 4] {
            repo.create(Comment::new(
                crate::domain::comment::CreateComment {
                    text: "fine enough".to_string(),
                    rating,
                    offer_id,
                },
                Uuid::new_v4(),
            ))
            .await
            .unwrap();
        }
        repo.create(Comment::new(
            crate::domain::comment::CreateComment {
                text: "unrelated".to_string(),
                rating: 5,
                offer_id: Uuid::new_v4(),
            },
            Uuid::new_v4(),
        ))
        .await
        .unwrap();

        assert_eq!(repo.find_by_offer(offer_id).await.unwrap().len(), 2);
    }
}
