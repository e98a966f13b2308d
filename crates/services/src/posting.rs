//! The post creation pipeline.
//!
//! A request is classified once into an intent (repost / command /
//! content), each intent runs its own validation chain, and the insert
//! only happens after every check in the chosen branch has passed, so a
//! validation failure never leaves a partial post behind. Counter bumps,
//! actor persistence and the creation event are returned as a
//! [`SideEffects`] bundle to run after the caller has its response.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use domains::{
    AppError, EventPublisher, Post, PostRepo, PostView, Result, User, UserRepo,
};
use futures::future::try_join_all;
use uuid::Uuid;

use crate::drive::DriveService;
use crate::effects::SideEffects;
use crate::intent::{classify, CreatePost, PostIntent, MAX_FILE_COUNT};
use crate::serialize::Serializer;

/// What the caller gets back from a successful creation request.
#[derive(Debug)]
pub enum CreateOutcome {
    /// A post was created; here is its serialized view.
    Created(PostView),
    /// An embedded command ran; there is no body to return.
    CommandExecuted,
}

pub struct PostingService {
    posts: Arc<dyn PostRepo>,
    users: Arc<dyn UserRepo>,
    drive: Arc<DriveService>,
    events: Arc<dyn EventPublisher>,
    serializer: Arc<Serializer>,
}

impl PostingService {
    pub fn new(
        posts: Arc<dyn PostRepo>,
        users: Arc<dyn UserRepo>,
        drive: Arc<DriveService>,
        events: Arc<dyn EventPublisher>,
        serializer: Arc<Serializer>,
    ) -> Self {
        Self {
            posts,
            users,
            drive,
            events,
            serializer,
        }
    }

    /// Runs the creation pipeline for `actor`.
    ///
    /// The returned [`SideEffects`] bundle has not run yet; the transport
    /// layer spawns it after replying, tests run it inline.
    pub async fn create(
        &self,
        actor: &User,
        req: CreatePost,
    ) -> Result<(CreateOutcome, SideEffects)> {
        match classify(req)? {
            PostIntent::Repost { target } => self.create_repost(actor, target).await,
            PostIntent::Command { name, argument } => {
                self.run_command(actor, &name, argument).await
            }
            PostIntent::Content {
                text,
                reply_to,
                files,
            } => self.create_content(actor, text, reply_to, files).await,
        }
    }

    async fn create_repost(
        &self,
        actor: &User,
        target: Uuid,
    ) -> Result<(CreateOutcome, SideEffects)> {
        let repostee = self
            .posts
            .get(target)
            .await
            .map_err(AppError::internal)?
            .ok_or(AppError::NotFound("post"))?;
        // No repost chains.
        if repostee.is_repost() {
            return Err(AppError::RepostOfRepost);
        }

        let post = Post {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            user_id: actor.id,
            text: None,
            file_ids: None,
            reply_to: None,
            repost: Some(repostee.id),
            next: None,
            prev: None,
            replies_count: 0,
            repost_count: 0,
        };
        self.posts.insert(&post).await.map_err(AppError::internal)?;

        let mut effects = SideEffects::new();
        let posts = self.posts.clone();
        let target_id = repostee.id;
        effects.defer("bump repost_count", async move {
            posts.increment_repost_count(target_id).await
        });

        self.finish_created(actor, post, effects).await
    }

    async fn run_command(
        &self,
        actor: &User,
        name: &str,
        argument: String,
    ) -> Result<(CreateOutcome, SideEffects)> {
        match name {
            "write" => {
                let file_name = format!("{}.txt", Utc::now().timestamp_millis());
                let file = self
                    .drive
                    .create_text_file(actor, file_name, Bytes::from(argument.into_bytes()))
                    .await?;
                let view = self.serializer.file(&file).await?;

                let mut effects = SideEffects::new();
                let events = self.events.clone();
                let actor_id = actor.id;
                effects.defer("publish file_created", async move {
                    events.file_created(actor_id, &view).await
                });

                tracing::debug!(actor = %actor_id, file = %file.id, "write command created drive file");
                Ok((CreateOutcome::CommandExecuted, effects))
            }
            other => Err(AppError::UnknownCommand(other.to_string())),
        }
    }

    async fn create_content(
        &self,
        actor: &User,
        text: Option<String>,
        reply_to: Option<Uuid>,
        files: Option<Vec<Uuid>>,
    ) -> Result<(CreateOutcome, SideEffects)> {
        let reply_target = match reply_to {
            Some(id) => {
                let target = self
                    .posts
                    .get(id)
                    .await
                    .map_err(AppError::internal)?
                    .ok_or(AppError::NotFound("post"))?;
                if target.is_repost() {
                    return Err(AppError::ReplyToRepost);
                }
                Some(target)
            }
            None => None,
        };

        if let Some(ids) = &files {
            if ids.len() > MAX_FILE_COUNT {
                return Err(AppError::TooManyFiles);
            }
        }

        // Fan-out: every attachment resolves concurrently, the first
        // failure fails the request.
        let attachments = match &files {
            Some(ids) => Some(
                try_join_all(
                    ids.iter()
                        .map(|id| self.drive.resolve_attachment(actor.id, *id)),
                )
                .await?,
            ),
            None => None,
        };

        if text.is_none() && attachments.is_none() {
            return Err(AppError::MissingContent);
        }

        let post = Post {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            user_id: actor.id,
            text,
            file_ids: attachments.map(|files| files.into_iter().map(|f| f.id).collect()),
            reply_to: reply_target.as_ref().map(|t| t.id),
            repost: None,
            next: None,
            prev: None,
            replies_count: 0,
            repost_count: 0,
        };
        self.posts.insert(&post).await.map_err(AppError::internal)?;

        let mut effects = SideEffects::new();
        if let Some(target) = reply_target {
            let posts = self.posts.clone();
            effects.defer("bump replies_count", async move {
                posts.increment_replies_count(target.id).await
            });
        }

        self.finish_created(actor, post, effects).await
    }

    /// Common tail of every post-creating branch: attach the actor with
    /// its bumped count, serialize, and queue persistence + publish.
    async fn finish_created(
        &self,
        actor: &User,
        post: Post,
        mut effects: SideEffects,
    ) -> Result<(CreateOutcome, SideEffects)> {
        let mut shown = actor.clone();
        shown.posts_count += 1;
        let view = self.serializer.post_with_user(&post, &shown).await?;

        let users = self.users.clone();
        let actor_id = actor.id;
        effects.defer("persist posts_count", async move {
            users.increment_posts_count(actor_id).await
        });

        let events = self.events.clone();
        let event_view = view.clone();
        effects.defer("publish post_created", async move {
            events.post_created(actor_id, &event_view).await
        });

        tracing::debug!(actor = %actor_id, post = %view.id, "post created");
        Ok((CreateOutcome::Created(view), effects))
    }
}
