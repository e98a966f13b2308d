//! Reply listing: offset-paginated replies of a single post.

use std::sync::Arc;

use domains::{AppError, PostRepo, PostView, Result, SortOrder};
use uuid::Uuid;

use crate::serialize::Serializer;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct RepliesQuery {
    pub limit: Option<u32>,
    pub offset: Option<u64>,
    pub sort: Option<SortOrder>,
}

pub struct ReplyService {
    posts: Arc<dyn PostRepo>,
    serializer: Arc<Serializer>,
}

impl ReplyService {
    pub fn new(posts: Arc<dyn PostRepo>, serializer: Arc<Serializer>) -> Self {
        Self { posts, serializer }
    }

    pub async fn list(&self, post_id: Uuid, query: RepliesQuery) -> Result<Vec<PostView>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::InvalidLimitRange);
        }
        let offset = query.offset.unwrap_or(0);
        let sort = query.sort.unwrap_or_default();

        let target = self
            .posts
            .get(post_id)
            .await
            .map_err(AppError::internal)?
            .ok_or(AppError::NotFound("post"))?;

        let replies = self
            .posts
            .replies(target.id, sort, limit, offset)
            .await
            .map_err(AppError::internal)?;

        let mut views = Vec::with_capacity(replies.len());
        for reply in &replies {
            views.push(self.serializer.post(reply).await?);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockDriveFileRepo, MockDriveFolderRepo, MockPostRepo, MockUserRepo, Post};
    use mockall::predicate::eq;

    fn service(posts: MockPostRepo, users: MockUserRepo) -> ReplyService {
        let serializer = Arc::new(Serializer::new(
            Arc::new(users),
            Arc::new(MockDriveFileRepo::new()),
            Arc::new(MockDriveFolderRepo::new()),
        ));
        ReplyService::new(Arc::new(posts), serializer)
    }

    fn post(user_id: Uuid) -> Post {
        Post {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            user_id,
            text: Some("parent".into()),
            file_ids: None,
            reply_to: None,
            repost: None,
            next: None,
            prev: None,
            replies_count: 0,
            repost_count: 0,
        }
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let mut posts = MockPostRepo::new();
        posts.expect_get().returning(|_| Ok(None));
        let service = service(posts, MockUserRepo::new());
        let err = service
            .list(Uuid::now_v7(), RepliesQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("post")));
    }

    #[tokio::test]
    async fn limit_is_validated_before_the_lookup() {
        // no expect_get: the store must not be touched
        let service = service(MockPostRepo::new(), MockUserRepo::new());
        let err = service
            .list(
                Uuid::now_v7(),
                RepliesQuery {
                    limit: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidLimitRange));
    }

    #[tokio::test]
    async fn defaults_are_desc_ten_from_zero() {
        let target = post(Uuid::now_v7());
        let target_id = target.id;
        let mut posts = MockPostRepo::new();
        posts
            .expect_get()
            .with(eq(target_id))
            .returning(move |_| Ok(Some(target.clone())));
        posts
            .expect_replies()
            .with(eq(target_id), eq(SortOrder::Desc), eq(10u32), eq(0u64))
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let service = service(posts, MockUserRepo::new());
        let views = service.list(target_id, RepliesQuery::default()).await.unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn sort_and_offset_are_passed_through() {
        let target = post(Uuid::now_v7());
        let target_id = target.id;
        let mut posts = MockPostRepo::new();
        posts
            .expect_get()
            .returning(move |_| Ok(Some(target.clone())));
        posts
            .expect_replies()
            .with(eq(target_id), eq(SortOrder::Asc), eq(25u32), eq(50u64))
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let service = service(posts, MockUserRepo::new());
        service
            .list(
                target_id,
                RepliesQuery {
                    limit: Some(25),
                    offset: Some(50),
                    sort: Some(SortOrder::Asc),
                },
            )
            .await
            .unwrap();
    }
}
