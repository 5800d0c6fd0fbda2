//! # User Entity
//!
//! Accounts: stored entity, creation/login DTOs, and the externally-safe
//! projections. The password hash never serializes and no projection
//! carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Usual,
    Pro,
}

impl UserKind {
    /// Wire names, consumed by the body constraint tables
    pub const NAMES: &'static [&'static str] = &["usual", "pro"];
}

/// Stored account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub kind: UserKind,
    /// Argon2id hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Weak references to favourite offers
    pub favorites: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(dto: RegisterUser, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: dto.name,
            email: dto.email,
            avatar_url: dto.avatar_url,
            kind: dto.kind,
            password_hash,
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Registration body, decoded after schema validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub password: String,
}

/// Login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Partial account update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UserKind>,
    #[serde(skip)]
    pub favorites: Option<Vec<Uuid>>,
}

impl User {
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(favorites) = &patch.favorites {
            self.favorites = favorites.clone();
        }
    }
}

/// Favourite toggle body for `PUT /users/favorites`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFavorite {
    pub offer_id: Uuid,
    pub is_favorite: bool,
}

/// Public account view: allow-listed, no internal fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
}

impl From<&User> for UserProjection {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            kind: user.kind,
        }
    }
}

/// Login response view
#[derive(Debug, Clone, Serialize)]
pub struct LoggedUserProjection {
    pub email: String,
    pub token: String,
}
