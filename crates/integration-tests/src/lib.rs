//! Shared harness for the end-to-end tests: an axum app over freshly
//! seeded in-memory adapters, driven with `tower::ServiceExt::oneshot`.

#![cfg(feature = "web-axum")]

use std::sync::Arc;

use api_adapters::{router, Adapters, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::User;
use storage_adapters::{BroadcastPublisher, MemoryBlobStore, MemoryStore};
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub events: Arc<BroadcastPublisher>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let events = Arc::new(BroadcastPublisher::default());

    let state = AppState::new(Adapters {
        posts: store.clone(),
        users: store.clone(),
        following: store.clone(),
        files: store.clone(),
        folders: store.clone(),
        blobs: blobs.clone(),
        events: events.clone(),
    });

    TestApp {
        router: router(state),
        store,
        blobs,
        events,
    }
}

impl TestApp {
    pub fn seed_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            token: format!("token-{username}"),
            posts_count: 0,
            created_at: Utc::now(),
        };
        self.store.add_user(user.clone());
        user
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build");
        send(self.router.clone(), request).await
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request should build");
        send(self.router.clone(), request).await
    }

    /// For non-JSON endpoints (`/metrics`).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("request should build");
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get_unauthenticated(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("request should build");
        send(self.router.clone(), request).await
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be json")
    };
    (status, json)
}
