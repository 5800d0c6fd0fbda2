//! # Application Assembly
//!
//! Explicit wiring: repositories, services, controllers and the filter
//! chain are constructed here and nowhere else. The store keeps concrete
//! repository handles so one instance can serve both its repository
//! trait and its existence probe.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::{JwtConfig, JwtManager};
use crate::config::AppConfig;
use crate::controllers::{comment_controller, offer_controller, user_controller};
use crate::pipeline::{mount, FilterChain, MountError, PipelineShared};
use crate::services::{CommentService, OfferService, UserService};
use crate::store::memory::{MemoryCommentRepository, MemoryOfferRepository, MemoryUserRepository};
use crate::store::{CommentRepository, ExistenceProbe, OfferRepository, UserRepository};
use crate::upload::LocalFileSink;

/// Shared in-memory backing store
#[derive(Clone)]
pub struct MemoryStore {
    pub offers: Arc<MemoryOfferRepository>,
    pub users: Arc<MemoryUserRepository>,
    pub comments: Arc<MemoryCommentRepository>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            offers: Arc::new(MemoryOfferRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            comments: Arc::new(MemoryCommentRepository::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully wired application
pub struct App {
    pub router: Router,
    pub store: MemoryStore,
}

/// Wire the whole application against a fresh in-memory store.
pub fn build_app(config: &AppConfig) -> Result<App, MountError> {
    let store = MemoryStore::new();

    let offers: Arc<dyn OfferRepository> = store.offers.clone();
    let users: Arc<dyn UserRepository> = store.users.clone();
    let comments: Arc<dyn CommentRepository> = store.comments.clone();
    let offer_probe: Arc<dyn ExistenceProbe> = store.offers.clone();
    let user_probe: Arc<dyn ExistenceProbe> = store.users.clone();

    let jwt = Arc::new(JwtManager::new(JwtConfig {
        secret: config.jwt_secret.clone(),
        ..JwtConfig::default()
    }));

    let offer_service = Arc::new(OfferService::new(
        offers.clone(),
        users.clone(),
        comments.clone(),
    ));
    let user_service = Arc::new(UserService::new(users.clone(), offers.clone(), jwt.clone()));
    let comment_service = Arc::new(CommentService::new(comments, offers, users));

    let avatar_sink = Arc::new(LocalFileSink::new(&config.upload_dir));

    let controllers = vec![
        offer_controller(offer_service, comment_service.clone(), offer_probe),
        user_controller(user_service, user_probe, avatar_sink),
        comment_controller(comment_service),
    ];

    let router = mount(
        controllers,
        PipelineShared {
            filters: FilterChain::standard(),
            tokens: jwt,
        },
    )?
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    Ok(App { router, store })
}
