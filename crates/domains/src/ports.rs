//! # Core Ports
//!
//! Contracts between the service logic and its infrastructure. Any adapter
//! (memory, Postgres, broadcast bus, ...) must implement these traits to be
//! wired into the binary. Adapters return `anyhow::Result`; the service
//! layer maps failures into the `AppError` taxonomy.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DriveFile, DriveFolder, Post, User};
use crate::views::{FileView, PostView};

/// Timeline pagination window. At most one cursor is ever set; the
/// conflict check happens before a query is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineWindow {
    /// No cursor: newest first by creation time.
    Latest,
    /// Posts with id strictly greater than the cursor, id ascending.
    Since(Uuid),
    /// Posts with id strictly less than the cursor, id descending.
    Max(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Post persistence and query contract.
///
/// The counter increments are atomic primitives: concurrent calls against
/// the same row must not lose updates. This is a deliberately stronger
/// guarantee than a read-then-write would give.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    async fn insert(&self, post: &Post) -> anyhow::Result<()>;

    /// Posts authored by any of `authors`, windowed and capped. Ordering
    /// follows the window: creation time descending for `Latest`, id
    /// ascending/descending for `Since`/`Max`.
    async fn timeline(
        &self,
        authors: &[Uuid],
        window: TimelineWindow,
        limit: u32,
    ) -> anyhow::Result<Vec<Post>>;

    /// Replies to `target`, ordered by id per `order`, offset-paginated.
    async fn replies(
        &self,
        target: Uuid,
        order: SortOrder,
        limit: u32,
        offset: u64,
    ) -> anyhow::Result<Vec<Post>>;

    async fn increment_repost_count(&self, id: Uuid) -> anyhow::Result<()>;
    async fn increment_replies_count(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Follow-graph read contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FollowingRepo: Send + Sync {
    /// All followee ids for the given follower. Does not include the
    /// follower itself; self-inclusion is the feed engine's job.
    async fn followees(&self, follower: Uuid) -> anyhow::Result<Vec<Uuid>>;
}

/// User persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<User>>;
    /// Atomic increment, same guarantee as the post counters.
    async fn increment_posts_count(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Drive file persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DriveFileRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFile>>;
    async fn insert(&self, file: &DriveFile) -> anyhow::Result<()>;
}

/// Drive folder read contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DriveFolderRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFolder>>;
}

/// Raw content storage for drive files, keyed by file id.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, id: Uuid, data: Bytes) -> anyhow::Result<()>;
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Bytes>>;
}

/// Fire-and-forget broadcast of creation events to subscribers.
///
/// Callers never await these on the request path; they run inside the
/// deferred side-effect bundle and failures are logged, not surfaced.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn post_created(&self, actor: Uuid, post: &PostView) -> anyhow::Result<()>;
    async fn file_created(&self, actor: Uuid, file: &FileView) -> anyhow::Result<()>;
}
