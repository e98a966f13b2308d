//! Broadcast event publisher.
//!
//! Creation events fan out to in-process subscribers over a tokio
//! broadcast channel. Delivery is best-effort: no subscribers (or a
//! lagging one) is not an error, matching the fire-and-forget contract of
//! the port.

use async_trait::async_trait;
use domains::{EventPublisher, FileView, PostView};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    PostCreated { actor: Uuid, post: PostView },
    FileCreated { actor: Uuid, file: FileView },
}

pub struct BroadcastPublisher {
    tx: broadcast::Sender<StreamEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn post_created(&self, actor: Uuid, post: &PostView) -> anyhow::Result<()> {
        // send only fails when there are no receivers, which is fine
        let _ = self.tx.send(StreamEvent::PostCreated {
            actor,
            post: post.clone(),
        });
        Ok(())
    }

    async fn file_created(&self, actor: Uuid, file: &FileView) -> anyhow::Result<()> {
        let _ = self.tx.send(StreamEvent::FileCreated {
            actor,
            file: file.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::UserView;

    fn view(actor: Uuid) -> PostView {
        PostView {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            user_id: actor,
            user: UserView {
                id: actor,
                username: "alice".into(),
                posts_count: 1,
                created_at: Utc::now(),
            },
            text: Some("hi".into()),
            files: None,
            reply_to: None,
            repost: None,
            replies_count: 0,
            repost_count: 0,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_posts() {
        let publisher = BroadcastPublisher::default();
        let mut rx = publisher.subscribe();
        let actor = Uuid::now_v7();
        publisher.post_created(actor, &view(actor)).await.unwrap();

        match rx.recv().await.unwrap() {
            StreamEvent::PostCreated { actor: a, post } => {
                assert_eq!(a, actor);
                assert_eq!(post.text.as_deref(), Some("hi"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_not_an_error() {
        let publisher = BroadcastPublisher::default();
        let actor = Uuid::now_v7();
        publisher.post_created(actor, &view(actor)).await.unwrap();
    }
}
