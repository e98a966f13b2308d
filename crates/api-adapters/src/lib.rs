//! murmur/crates/api-adapters/src/lib.rs
//!
//! The web adapter for Murmur. Gated behind `web-axum` so the workspace
//! can compile service logic without pulling in the HTTP stack.

#![cfg(feature = "web-axum")]

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use domains::{
    BlobStore, DriveFileRepo, DriveFolderRepo, EventPublisher, FollowingRepo, PostRepo, UserRepo,
};
use services::{DriveService, FeedService, PostingService, ReplyService, Serializer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use metrics::Metrics;

/// Everything the binary has to provide: one adapter per port.
pub struct Adapters {
    pub posts: Arc<dyn PostRepo>,
    pub users: Arc<dyn UserRepo>,
    pub following: Arc<dyn FollowingRepo>,
    pub files: Arc<dyn DriveFileRepo>,
    pub folders: Arc<dyn DriveFolderRepo>,
    pub blobs: Arc<dyn BlobStore>,
    pub events: Arc<dyn EventPublisher>,
}

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub posting: Arc<PostingService>,
    pub feed: Arc<FeedService>,
    pub replies: Arc<ReplyService>,
    pub drive: Arc<DriveService>,
    pub users: Arc<dyn UserRepo>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires the service layer over a set of port adapters.
    pub fn new(adapters: Adapters) -> Self {
        let serializer = Arc::new(Serializer::new(
            adapters.users.clone(),
            adapters.files.clone(),
            adapters.folders.clone(),
        ));
        let drive = Arc::new(DriveService::new(
            adapters.files.clone(),
            adapters.folders.clone(),
            adapters.blobs.clone(),
        ));
        let posting = Arc::new(PostingService::new(
            adapters.posts.clone(),
            adapters.users.clone(),
            drive.clone(),
            adapters.events.clone(),
            serializer.clone(),
        ));
        let feed = Arc::new(FeedService::new(
            adapters.posts.clone(),
            adapters.following.clone(),
            serializer.clone(),
        ));
        let replies = Arc::new(ReplyService::new(adapters.posts, serializer));

        Self {
            posting,
            feed,
            replies,
            drive,
            users: adapters.users,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/posts", post(handlers::create_post))
        .route("/api/posts/timeline", get(handlers::timeline))
        .route("/api/posts/{id}/replies", get(handlers::replies))
        .route("/api/account", get(handlers::account))
        .route("/api/drive/folders/{id}", get(handlers::show_folder))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
