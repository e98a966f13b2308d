//! Entity → external view serialization.
//!
//! The serializer populates the owning user on every post view and expands
//! attached files (including their folder chains) on demand. Posts whose
//! file records have since vanished simply omit those entries; a stale id
//! is not worth failing a read for.

use std::sync::Arc;

use domains::{
    AppError, DriveFile, DriveFileRepo, DriveFolderRepo, FileView, Post, PostView, Result, User,
    UserRepo, UserView,
};

use crate::drive::{resolve_folder, ResolveOptions};

pub struct Serializer {
    users: Arc<dyn UserRepo>,
    files: Arc<dyn DriveFileRepo>,
    folders: Arc<dyn DriveFolderRepo>,
}

impl Serializer {
    pub fn new(
        users: Arc<dyn UserRepo>,
        files: Arc<dyn DriveFileRepo>,
        folders: Arc<dyn DriveFolderRepo>,
    ) -> Self {
        Self {
            users,
            files,
            folders,
        }
    }

    /// Serializes a post, fetching its owning user.
    pub async fn post(&self, post: &Post) -> Result<PostView> {
        let user = self
            .users
            .get(post.user_id)
            .await
            .map_err(AppError::internal)?
            .ok_or(AppError::NotFound("user"))?;
        self.post_with_user(post, &user).await
    }

    /// Serializes a post against an already-loaded user record. The
    /// creation pipeline uses this to attach the actor with its bumped
    /// `posts_count` before persistence catches up.
    pub async fn post_with_user(&self, post: &Post, user: &User) -> Result<PostView> {
        let files = match &post.file_ids {
            Some(ids) => {
                let mut views = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(file) = self.files.get(*id).await.map_err(AppError::internal)? {
                        views.push(self.file(&file).await?);
                    }
                }
                Some(views)
            }
            None => None,
        };

        Ok(PostView {
            id: post.id,
            created_at: post.created_at,
            user_id: post.user_id,
            user: UserView::from(user),
            text: post.text.clone(),
            files,
            reply_to: post.reply_to,
            repost: post.repost,
            replies_count: post.replies_count,
            repost_count: post.repost_count,
        })
    }

    /// Serializes a drive file, resolving the owning folder chain.
    pub async fn file(&self, file: &DriveFile) -> Result<FileView> {
        let folder = match file.folder_id {
            Some(id) => Some(
                resolve_folder(self.folders.as_ref(), id.into(), &ResolveOptions::default())
                    .await?,
            ),
            None => None,
        };
        Ok(FileView {
            id: file.id,
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.size,
            user_id: file.user_id,
            created_at: file.created_at,
            folder,
        })
    }
}
