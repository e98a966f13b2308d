//! End-to-end coverage of `GET /api/posts/{id}/replies`: target lookup,
//! sort order, offset pagination and the deferred reply counter.

use axum::http::StatusCode;
use domains::PostRepo;
use integration_tests::{test_app, TestApp};
use serde_json::json;
use storage_adapters::StreamEvent;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

async fn post(app: &TestApp, token: &str, body: serde_json::Value) -> Uuid {
    let (status, body) = app.post_json("/api/posts", token, body).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body["id"].clone()).unwrap()
}

fn ids(body: &serde_json::Value) -> Vec<Uuid> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|post| serde_json::from_value(post["id"].clone()).unwrap())
        .collect()
}

#[tokio::test]
async fn unknown_target_is_a_404() {
    let app = test_app();
    let alice = app.seed_user("alice");

    let (status, body) = app
        .get(
            &format!("/api/posts/{}/replies", Uuid::now_v7()),
            &alice.token,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn replies_default_to_newest_first() {
    let app = test_app();
    let alice = app.seed_user("alice");
    let parent = post(&app, &alice.token, json!({ "text": "parent" })).await;
    let r1 = post(&app, &alice.token, json!({ "text": "r1", "reply_to": parent })).await;
    let r2 = post(&app, &alice.token, json!({ "text": "r2", "reply_to": parent })).await;

    let (status, body) = app
        .get(&format!("/api/posts/{parent}/replies"), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![r2, r1]);
    assert_eq!(body[0]["reply_to"], json!(parent));
}

#[tokio::test]
async fn ascending_sort_and_offset_page_through() {
    let app = test_app();
    let alice = app.seed_user("alice");
    let parent = post(&app, &alice.token, json!({ "text": "parent" })).await;
    let mut replies = Vec::new();
    for i in 0..4 {
        replies.push(
            post(
                &app,
                &alice.token,
                json!({ "text": i.to_string(), "reply_to": parent }),
            )
            .await,
        );
    }

    let (status, body) = app
        .get(
            &format!("/api/posts/{parent}/replies?sort=asc&limit=2&offset=1"),
            &alice.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![replies[1], replies[2]]);
}

#[tokio::test]
async fn limit_is_checked_before_the_target_lookup() {
    let app = test_app();
    let alice = app.seed_user("alice");

    // even a nonexistent target reports the limit problem first
    let (status, body) = app
        .get(
            &format!("/api/posts/{}/replies?limit=0", Uuid::now_v7()),
            &alice.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LIMIT_RANGE");
}

#[tokio::test]
async fn a_post_without_replies_lists_empty() {
    let app = test_app();
    let alice = app.seed_user("alice");
    let parent = post(&app, &alice.token, json!({ "text": "lonely" })).await;

    let (status, body) = app
        .get(&format!("/api/posts/{parent}/replies"), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn replying_bumps_the_parent_counter() {
    let app = test_app();
    let alice = app.seed_user("alice");
    let mut rx = app.events.subscribe();
    let parent = post(&app, &alice.token, json!({ "text": "parent" })).await;
    post(&app, &alice.token, json!({ "text": "re", "reply_to": parent })).await;

    // wait for both creation events; the counter bump is queued before
    // the reply's publish
    for _ in 0..2 {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event within a second")
            .expect("channel open");
        assert!(matches!(event, StreamEvent::PostCreated { .. }));
    }
    let stored = PostRepo::get(app.store.as_ref(), parent)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.replies_count, 1);
}

#[tokio::test]
async fn replying_to_a_repost_is_rejected() {
    let app = test_app();
    let alice = app.seed_user("alice");
    let original = post(&app, &alice.token, json!({ "text": "original" })).await;
    let repost = post(&app, &alice.token, json!({ "repost": original })).await;

    let (status, body) = app
        .post_json(
            "/api/posts",
            &alice.token,
            json!({ "text": "re", "reply_to": repost }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REPLY_TO_REPOST");
}
