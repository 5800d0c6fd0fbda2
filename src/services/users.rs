//! # User Service
//!
//! Accounts: registration, credential verification, favourites. Expected
//! domain conditions (duplicate email, unknown offer) are modeled errors;
//! only genuine faults travel as the 500 category.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, JwtManager};
use crate::domain::user::{LoginUser, RegisterUser, User, UserPatch};
use crate::pipeline::{ApiError, ApiResult, Identity};
use crate::store::{OfferRepository, UserRepository};

const COMPONENT: &str = "UserService";

pub struct UserService {
    users: Arc<dyn UserRepository>,
    offers: Arc<dyn OfferRepository>,
    jwt: Arc<JwtManager>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        offers: Arc<dyn OfferRepository>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self { users, offers, jwt }
    }

    /// Register an account; the email must be unique
    pub async fn register(&self, dto: RegisterUser) -> ApiResult<User> {
        if self.users.find_by_email(&dto.email).await?.is_some() {
            return Err(ApiError::http(
                StatusCode::CONFLICT,
                format!("User with email {} already exists", dto.email),
                COMPONENT,
            ));
        }

        let password_hash = hash_password(&dto.password)
            .map_err(|error| ApiError::unclassified(error.to_string(), COMPONENT))?;
        let user = self.users.create(User::new(dto, password_hash)).await?;
        tracing::info!(user = %user.id, email = %user.email, "new user registered");
        Ok(user)
    }

    /// Verify credentials and issue an access token. Both unknown email
    /// and wrong password collapse into one answer.
    pub async fn login(&self, dto: LoginUser) -> ApiResult<(User, String)> {
        let invalid = || ApiError::auth("Invalid credentials", COMPONENT);

        let user = self.users.find_by_email(&dto.email).await?.ok_or_else(invalid)?;
        let verified = verify_password(&dto.password, &user.password_hash)
            .map_err(|error| ApiError::unclassified(error.to_string(), COMPONENT))?;
        if !verified {
            return Err(invalid());
        }

        let token = self
            .jwt
            .issue(user.id, &user.email)
            .map_err(|error| ApiError::unclassified(error.to_string(), COMPONENT))?;
        Ok((user, token))
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn update_by_id(&self, id: Uuid, patch: UserPatch) -> ApiResult<Option<User>> {
        Ok(self.users.update_by_id(id, &patch).await?)
    }

    /// Toggle an offer in the caller's favourite set
    pub async fn set_favorite(
        &self,
        caller: &Identity,
        offer_id: Uuid,
        is_favorite: bool,
    ) -> ApiResult<()> {
        if !self.offers.exists(offer_id).await? {
            return Err(ApiError::not_found("Offer", offer_id, COMPONENT));
        }

        let user = self.users.find_by_id(caller.id).await?.ok_or_else(|| {
            ApiError::unclassified("authenticated user is missing from the store", COMPONENT)
        })?;

        let mut favorites: HashSet<Uuid> = user.favorites.into_iter().collect();
        if is_favorite {
            favorites.insert(offer_id);
        } else {
            favorites.remove(&offer_id);
        }

        self.users
            .update_by_id(
                caller.id,
                &UserPatch {
                    favorites: Some(favorites.into_iter().collect()),
                    ..UserPatch::default()
                },
            )
            .await?;
        Ok(())
    }
}
