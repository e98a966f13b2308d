//! # Domain Models
//!
//! These structs represent the core entities of Murmur.
//! We use UUID v7 for time-ordered, globally unique identification, which
//! lets a post id double as a creation-order pagination cursor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fundamental unit of conversation.
///
/// A post is exactly one of: a content post (text and/or files), a reply
/// (`reply_to` set), or a repost (`repost` set). `repost` is mutually
/// exclusive with `text`, `files` and `reply_to` at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// The owning actor. Always present.
    pub user_id: Uuid,
    /// Trimmed body, 1–300 chars. `None` means no text.
    pub text: Option<String>,
    /// Attached drive files, 0–4, deduplicated, order-preserving.
    pub file_ids: Option<Vec<Uuid>>,
    /// Parent post when this is a reply.
    pub reply_to: Option<Uuid>,
    /// Target post when this is a repost.
    pub repost: Option<Uuid>,
    /// Reserved chain links. Never populated by the posting pipeline.
    pub next: Option<Uuid>,
    pub prev: Option<Uuid>,
    /// Derived counters. Non-authoritative; bumped on the *referenced*
    /// post by background tasks after a reply/repost is created.
    pub replies_count: i64,
    pub repost_count: i64,
}

impl Post {
    pub fn is_repost(&self) -> bool {
        self.repost.is_some()
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

/// A registered actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Opaque API credential checked by the bearer-token extractor.
    /// Session management itself lives outside this service.
    pub token: String,
    /// Monotonically increasing; bumped after every successful creation.
    pub posts_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A follow edge. Read-only from this service's perspective; it defines
/// whose posts appear in the follower's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Following {
    pub follower: Uuid,
    pub followee: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An attachable drive resource. Resolved (never created) by the posting
/// pipeline, except via the embedded `$write` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A drive folder. Folders form a parent chain which the reference
/// resolver expands into a nested external view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveFolder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
