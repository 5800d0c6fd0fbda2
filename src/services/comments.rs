//! # Comment Service
//!
//! Comments on offers. Creation checks the referenced offer; listings come
//! back newest first, capped.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::comment::{Comment, CreateComment, DEFAULT_COMMENT_COUNT};
use crate::domain::user::User;
use crate::pipeline::{ApiError, ApiResult, Identity};
use crate::store::{CommentRepository, OfferRepository, UserRepository};

const COMPONENT: &str = "CommentService";

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    offers: Arc<dyn OfferRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        offers: Arc<dyn OfferRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            offers,
            users,
        }
    }

    /// Create a comment authored by the caller
    pub async fn create(
        &self,
        dto: CreateComment,
        author: &Identity,
    ) -> ApiResult<(Comment, Option<User>)> {
        if !self.offers.exists(dto.offer_id).await? {
            return Err(ApiError::not_found("Offer", dto.offer_id, COMPONENT));
        }

        let comment = self.comments.create(Comment::new(dto, author.id)).await?;
        let author = self.users.find_by_id(comment.author_id).await?;
        Ok((comment, author))
    }

    /// Comments for one offer, newest first, with resolved authors
    pub async fn find_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<(Comment, Option<User>)>> {
        let mut comments = self.comments.find_by_offer(offer_id).await?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments.truncate(DEFAULT_COMMENT_COUNT);

        let mut resolved = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self.users.find_by_id(comment.author_id).await?;
            resolved.push((comment, author));
        }
        Ok(resolved)
    }
}
