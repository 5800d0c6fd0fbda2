//! # Comment Entity
//!
//! Comments reference an offer and an author by id. They are the input to
//! the derived-field aggregation on offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserProjection};

/// Cap on comments returned per offer
pub const DEFAULT_COMMENT_COUNT: usize = 50;

/// Stored comment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    /// 1..=5
    pub rating: u8,
    pub offer_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(dto: CreateComment, author_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: dto.text,
            rating: dto.rating,
            offer_id: dto.offer_id,
            author_id,
            created_at: Utc::now(),
        }
    }
}

/// Creation body; the author comes from the identity context, not the body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub text: String,
    pub rating: u8,
    pub offer_id: Uuid,
}

/// Public comment view with its resolved author
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentProjection {
    pub id: Uuid,
    pub text: String,
    pub rating: u8,
    pub post_date: DateTime<Utc>,
    pub author: Option<UserProjection>,
}

impl CommentProjection {
    pub fn new(comment: &Comment, author: Option<&User>) -> Self {
        Self {
            id: comment.id,
            text: comment.text.clone(),
            rating: comment.rating,
            post_date: comment.created_at,
            author: author.map(UserProjection::from),
        }
    }
}
