//! Timeline feed assembly.
//!
//! A timeline is the posts of everyone the actor follows, plus the
//! actor's own posts, windowed by an optional cursor. With no cursor the
//! feed orders by creation time (newest first); cursor windows order by
//! post id. Post ids are UUIDv7 and therefore time-monotonic, so the two
//! orderings coincide in practice, but callers should treat the result
//! as "by recency" rather than relying on a specific sort key.

use std::sync::Arc;

use domains::{AppError, FollowingRepo, PostRepo, PostView, Result, TimelineWindow, User};
use uuid::Uuid;

use crate::serialize::Serializer;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineQuery {
    pub limit: Option<u32>,
    pub since_id: Option<Uuid>,
    pub max_id: Option<Uuid>,
}

pub struct FeedService {
    posts: Arc<dyn PostRepo>,
    following: Arc<dyn FollowingRepo>,
    serializer: Arc<Serializer>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepo>,
        following: Arc<dyn FollowingRepo>,
        serializer: Arc<Serializer>,
    ) -> Self {
        Self {
            posts,
            following,
            serializer,
        }
    }

    pub async fn timeline(&self, actor: &User, query: TimelineQuery) -> Result<Vec<PostView>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::InvalidLimitRange);
        }

        let window = match (query.since_id, query.max_id) {
            (Some(_), Some(_)) => return Err(AppError::ConflictingCursors),
            (Some(since), None) => TimelineWindow::Since(since),
            (None, Some(max)) => TimelineWindow::Max(max),
            (None, None) => TimelineWindow::Latest,
        };

        // A user always sees their own posts, even with no followees.
        let mut authors = self
            .following
            .followees(actor.id)
            .await
            .map_err(AppError::internal)?;
        authors.push(actor.id);

        let posts = self
            .posts
            .timeline(&authors, window, limit)
            .await
            .map_err(AppError::internal)?;

        let mut views = Vec::with_capacity(posts.len());
        for post in &posts {
            views.push(self.serializer.post(post).await?);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{
        MockDriveFileRepo, MockDriveFolderRepo, MockFollowingRepo, MockPostRepo, MockUserRepo,
    };
    use mockall::predicate::eq;

    fn actor() -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".into(),
            token: "t".into(),
            posts_count: 0,
            created_at: Utc::now(),
        }
    }

    fn service(
        posts: MockPostRepo,
        following: MockFollowingRepo,
        users: MockUserRepo,
    ) -> FeedService {
        let serializer = Arc::new(Serializer::new(
            Arc::new(users),
            Arc::new(MockDriveFileRepo::new()),
            Arc::new(MockDriveFolderRepo::new()),
        ));
        FeedService::new(Arc::new(posts), Arc::new(following), serializer)
    }

    #[tokio::test]
    async fn both_cursors_conflict() {
        let service = service(
            MockPostRepo::new(),
            MockFollowingRepo::new(),
            MockUserRepo::new(),
        );
        let err = service
            .timeline(
                &actor(),
                TimelineQuery {
                    since_id: Some(Uuid::now_v7()),
                    max_id: Some(Uuid::now_v7()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConflictingCursors));
    }

    #[tokio::test]
    async fn limit_must_be_within_range() {
        for bad in [0u32, 101] {
            let service = service(
                MockPostRepo::new(),
                MockFollowingRepo::new(),
                MockUserRepo::new(),
            );
            let err = service
                .timeline(
                    &actor(),
                    TimelineQuery {
                        limit: Some(bad),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidLimitRange));
        }
    }

    #[tokio::test]
    async fn actor_is_always_part_of_the_author_set() {
        let actor = actor();
        let actor_id = actor.id;
        let followee = Uuid::now_v7();
        let mut following = MockFollowingRepo::new();
        following
            .expect_followees()
            .with(eq(actor_id))
            .returning(move |_| Ok(vec![followee]));
        let mut posts = MockPostRepo::new();
        posts
            .expect_timeline()
            .withf(move |authors, window, limit| {
                authors.contains(&actor_id)
                    && authors.contains(&followee)
                    && *window == TimelineWindow::Latest
                    && *limit == 10
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = service(posts, following, MockUserRepo::new());
        let views = service
            .timeline(&actor, TimelineQuery::default())
            .await
            .unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn since_cursor_builds_an_ascending_window() {
        let actor = actor();
        let cursor = Uuid::now_v7();
        let mut following = MockFollowingRepo::new();
        following.expect_followees().returning(|_| Ok(vec![]));
        let mut posts = MockPostRepo::new();
        posts
            .expect_timeline()
            .withf(move |_, window, _| *window == TimelineWindow::Since(cursor))
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = service(posts, following, MockUserRepo::new());
        service
            .timeline(
                &actor,
                TimelineQuery {
                    since_id: Some(cursor),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
}
