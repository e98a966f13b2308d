//! In-memory entity store.
//!
//! The default store: a set of sharded concurrent maps. Counter
//! increments mutate the record under its shard lock, so concurrent bumps
//! against the same row never lose an update, the same guarantee the
//! Postgres adapter gets from `SET n = n + 1`.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    DriveFile, DriveFileRepo, DriveFolder, DriveFolderRepo, Following, FollowingRepo, Post,
    PostRepo, SortOrder, TimelineWindow, User, UserRepo,
};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    posts: DashMap<Uuid, Post>,
    users: DashMap<Uuid, User>,
    followings: DashMap<(Uuid, Uuid), Following>,
    files: DashMap<Uuid, DriveFile>,
    folders: DashMap<Uuid, DriveFolder>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers for wiring and tests. Entities other than posts and
    // drive files are created outside this service's scope.

    pub fn add_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn add_following(&self, follower: Uuid, followee: Uuid) {
        let edge = Following {
            follower,
            followee,
            created_at: chrono::Utc::now(),
        };
        self.followings.insert((follower, followee), edge);
    }

    pub fn add_file(&self, file: DriveFile) {
        self.files.insert(file.id, file);
    }

    pub fn add_folder(&self, folder: DriveFolder) {
        self.folders.insert(folder.id, folder);
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn insert(&self, post: &Post) -> anyhow::Result<()> {
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn timeline(
        &self,
        authors: &[Uuid],
        window: TimelineWindow,
        limit: u32,
    ) -> anyhow::Result<Vec<Post>> {
        let mut rows: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| authors.contains(&entry.user_id))
            .filter(|entry| match window {
                TimelineWindow::Latest => true,
                TimelineWindow::Since(cursor) => entry.id > cursor,
                TimelineWindow::Max(cursor) => entry.id < cursor,
            })
            .map(|entry| entry.clone())
            .collect();

        match window {
            // tie-break on id so equal timestamps still order stably
            TimelineWindow::Latest => {
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
            TimelineWindow::Since(_) => rows.sort_by(|a, b| a.id.cmp(&b.id)),
            TimelineWindow::Max(_) => rows.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn replies(
        &self,
        target: Uuid,
        order: SortOrder,
        limit: u32,
        offset: u64,
    ) -> anyhow::Result<Vec<Post>> {
        let mut rows: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.reply_to == Some(target))
            .map(|entry| entry.clone())
            .collect();
        match order {
            SortOrder::Asc => rows.sort_by(|a, b| a.id.cmp(&b.id)),
            SortOrder::Desc => rows.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn increment_repost_count(&self, id: Uuid) -> anyhow::Result<()> {
        match self.posts.get_mut(&id) {
            Some(mut post) => {
                post.repost_count += 1;
                Ok(())
            }
            None => anyhow::bail!("post {id} not found"),
        }
    }

    async fn increment_replies_count(&self, id: Uuid) -> anyhow::Result<()> {
        match self.posts.get_mut(&id) {
            Some(mut post) => {
                post.replies_count += 1;
                Ok(())
            }
            None => anyhow::bail!("post {id} not found"),
        }
    }
}

#[async_trait]
impl FollowingRepo for MemoryStore {
    async fn followees(&self, follower: Uuid) -> anyhow::Result<Vec<Uuid>> {
        Ok(self
            .followings
            .iter()
            .filter(|edge| edge.follower == follower)
            .map(|edge| edge.followee)
            .collect())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|user| user.token == token)
            .map(|user| user.clone()))
    }

    async fn increment_posts_count(&self, id: Uuid) -> anyhow::Result<()> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.posts_count += 1;
                Ok(())
            }
            None => anyhow::bail!("user {id} not found"),
        }
    }
}

#[async_trait]
impl DriveFileRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFile>> {
        Ok(self.files.get(&id).map(|f| f.clone()))
    }

    async fn insert(&self, file: &DriveFile) -> anyhow::Result<()> {
        self.files.insert(file.id, file.clone());
        Ok(())
    }
}

#[async_trait]
impl DriveFolderRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFolder>> {
        Ok(self.folders.get(&id).map(|f| f.clone()))
    }
}
