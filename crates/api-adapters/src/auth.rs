//! Actor resolution.
//!
//! Session management is not this service's business; requests arrive
//! with an opaque bearer token which we look up against the user store.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{AppError, User};

use crate::error::ApiError;
use crate::AppState;

/// The authenticated acting user, extracted from `Authorization: Bearer`.
pub struct Actor(pub User);

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

        let user = state
            .users
            .find_by_token(token)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::Unauthorized("unknown token".into()))?;

        Ok(Actor(user))
    }
}
