//! # Murmur Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: which entity store and blob store back the port traits is
//! decided here, the rest of the workspace never knows.

use std::sync::Arc;

use api_adapters::{router, Adapters, AppState};
use storage_adapters::{BroadcastPublisher, MemoryStore};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load()?;
    init_tracing(cfg.log.json);

    // 1. Entity store
    #[cfg(feature = "db-postgres")]
    let store = Arc::new(PgStore::connect(cfg.database.url.expose_secret()).await?);

    #[cfg(not(feature = "db-postgres"))]
    let store = {
        let store = Arc::new(MemoryStore::new());
        seed_demo_user(&store);
        store
    };

    // 2. Blob store
    #[cfg(feature = "media-local")]
    let blobs = Arc::new(storage_adapters::LocalBlobStore::new(
        cfg.media.root.clone().into(),
    ));

    #[cfg(not(feature = "media-local"))]
    let blobs = Arc::new(storage_adapters::MemoryBlobStore::new());

    // 3. Event bus
    let events = Arc::new(BroadcastPublisher::new(cfg.events.capacity));

    let state = AppState::new(Adapters {
        posts: store.clone(),
        users: store.clone(),
        following: store.clone(),
        files: store.clone(),
        folders: store.clone(),
        blobs,
        events,
    });

    let app = router(state);
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    tracing::info!(%addr, "murmur listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// The memory store starts empty; without a user every request is a 401.
/// Seed a demo account so a fresh binary is immediately usable.
#[cfg(not(feature = "db-postgres"))]
fn seed_demo_user(store: &MemoryStore) {
    let user = domains::User {
        id: uuid::Uuid::now_v7(),
        username: "demo".to_string(),
        token: "demo-token".to_string(),
        posts_count: 0,
        created_at: chrono::Utc::now(),
    };
    tracing::info!(user = %user.id, token = %user.token, "seeded demo user");
    store.add_user(user);
}
