//! Postgres entity store.
//!
//! Runtime-checked queries against the schema in `migrations/`. Counter
//! bumps are single `SET n = n + 1` statements, so concurrent updates to
//! the same row serialize inside Postgres and never lose an increment.

use async_trait::async_trait;
use domains::{
    DriveFile, DriveFileRepo, DriveFolder, DriveFolderRepo, FollowingRepo, Post, PostRepo,
    SortOrder, TimelineWindow, User, UserRepo,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies pending migrations.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(16).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_post(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        created_at: row.get("created_at"),
        user_id: row.get("user_id"),
        text: row.get("text"),
        file_ids: row.get("file_ids"),
        reply_to: row.get("reply_to"),
        repost: row.get("repost"),
        next: row.get("next"),
        prev: row.get("prev"),
        replies_count: row.get("replies_count"),
        repost_count: row.get("repost_count"),
    }
}

fn row_to_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        token: row.get("token"),
        posts_count: row.get("posts_count"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PostRepo for PgStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn insert(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO posts \
             (id, created_at, user_id, text, file_ids, reply_to, repost, next, prev, replies_count, repost_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(post.id)
        .bind(post.created_at)
        .bind(post.user_id)
        .bind(&post.text)
        .bind(&post.file_ids)
        .bind(post.reply_to)
        .bind(post.repost)
        .bind(post.next)
        .bind(post.prev)
        .bind(post.replies_count)
        .bind(post.repost_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn timeline(
        &self,
        authors: &[Uuid],
        window: TimelineWindow,
        limit: u32,
    ) -> anyhow::Result<Vec<Post>> {
        let rows = match window {
            TimelineWindow::Latest => {
                sqlx::query(
                    "SELECT * FROM posts WHERE user_id = ANY($1) \
                     ORDER BY created_at DESC, id DESC LIMIT $2",
                )
                .bind(authors)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
            TimelineWindow::Since(cursor) => {
                sqlx::query(
                    "SELECT * FROM posts WHERE user_id = ANY($1) AND id > $2 \
                     ORDER BY id ASC LIMIT $3",
                )
                .bind(authors)
                .bind(cursor)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
            TimelineWindow::Max(cursor) => {
                sqlx::query(
                    "SELECT * FROM posts WHERE user_id = ANY($1) AND id < $2 \
                     ORDER BY id DESC LIMIT $3",
                )
                .bind(authors)
                .bind(cursor)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn replies(
        &self,
        target: Uuid,
        order: SortOrder,
        limit: u32,
        offset: u64,
    ) -> anyhow::Result<Vec<Post>> {
        let sql = match order {
            SortOrder::Asc => {
                "SELECT * FROM posts WHERE reply_to = $1 ORDER BY id ASC LIMIT $2 OFFSET $3"
            }
            SortOrder::Desc => {
                "SELECT * FROM posts WHERE reply_to = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
            }
        };
        let rows = sqlx::query(sql)
            .bind(target)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn increment_repost_count(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET repost_count = repost_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_replies_count(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET replies_count = replies_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FollowingRepo for PgStore {
    async fn followees(&self, follower: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT followee FROM followings WHERE follower = $1")
            .bind(follower)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("followee")).collect())
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn increment_posts_count(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET posts_count = posts_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DriveFileRepo for PgStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFile>> {
        let row = sqlx::query("SELECT * FROM drive_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| DriveFile {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            content_type: row.get("content_type"),
            size: row.get::<i64, _>("size") as u64,
            folder_id: row.get("folder_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn insert(&self, file: &DriveFile) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO drive_files (id, user_id, name, content_type, size, folder_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(file.id)
        .bind(file.user_id)
        .bind(&file.name)
        .bind(&file.content_type)
        .bind(file.size as i64)
        .bind(file.folder_id)
        .bind(file.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DriveFolderRepo for PgStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<DriveFolder>> {
        let row = sqlx::query("SELECT * FROM drive_folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| DriveFolder {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            parent_id: row.get("parent_id"),
            created_at: row.get("created_at"),
        }))
    }
}
