//! HTTP handlers.
//!
//! Thin coordination between request DTOs and the service layer. The
//! create handler is where the deferred side-effect bundle detaches: the
//! response value is in hand first, then the bundle is spawned.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{FolderView, PostView, SortOrder, UserView};
use serde::Deserialize;
use services::{CreateOutcome, CreatePost, RepliesQuery, TimelineQuery};
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub repost: Option<Uuid>,
    pub text: Option<String>,
    pub reply_to: Option<Uuid>,
    /// Comma-separated drive file ids.
    pub files: Option<String>,
}

pub async fn create_post(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(body): Json<CreatePostBody>,
) -> Result<Response, ApiError> {
    state.metrics.observe("create_post");
    let req = CreatePost {
        repost: body.repost,
        text: body.text,
        reply_to: body.reply_to,
        files: body.files,
    };
    let (outcome, effects) = state.posting.create(&actor, req).await?;
    let response = match outcome {
        CreateOutcome::Created(view) => (StatusCode::OK, Json(view)).into_response(),
        CreateOutcome::CommandExecuted => StatusCode::NO_CONTENT.into_response(),
    };
    // reply first, side effects after
    let _ = effects.spawn();
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct TimelineParams {
    pub limit: Option<u32>,
    pub since_id: Option<Uuid>,
    pub max_id: Option<Uuid>,
}

pub async fn timeline(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<TimelineParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    state.metrics.observe("timeline");
    let query = TimelineQuery {
        limit: params.limit,
        since_id: params.since_id,
        max_id: params.max_id,
    };
    Ok(Json(state.feed.timeline(&actor, query).await?))
}

#[derive(Debug, Deserialize)]
pub struct RepliesParams {
    pub limit: Option<u32>,
    pub offset: Option<u64>,
    pub sort: Option<SortOrder>,
}

pub async fn replies(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
    Query(params): Query<RepliesParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    state.metrics.observe("replies");
    let query = RepliesQuery {
        limit: params.limit,
        offset: params.offset,
        sort: params.sort,
    };
    Ok(Json(state.replies.list(id, query).await?))
}

pub async fn account(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Json<UserView> {
    state.metrics.observe("account");
    Json(UserView::from(&actor))
}

#[derive(Debug, Deserialize)]
pub struct FolderParams {
    pub include_parent: Option<bool>,
}

pub async fn show_folder(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
    Query(params): Query<FolderParams>,
) -> Result<Json<FolderView>, ApiError> {
    state.metrics.observe("show_folder");
    let include_parent = params.include_parent.unwrap_or(true);
    Ok(Json(state.drive.show_folder(id, include_parent).await?))
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
