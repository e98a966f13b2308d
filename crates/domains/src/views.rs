//! External representations.
//!
//! Views are what leaves the service: serialized onto HTTP responses and
//! carried by published events. The exact field set is intentionally
//! small; richer projections belong to downstream consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub posts_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&crate::models::User> for UserView {
    fn from(user: &crate::models::User) -> Self {
        UserView {
            id: user.id,
            username: user.username.clone(),
            posts_count: user.posts_count,
            created_at: user.created_at,
        }
    }
}

/// A drive folder with its parent chain expanded in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderView {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<FolderView>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileView {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Owning folder, resolved with its parent chain embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    /// The owning actor, always populated by the serializer.
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repost: Option<Uuid>,
    pub replies_count: i64,
    pub repost_count: i64,
}
