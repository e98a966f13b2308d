//! `AppError` → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde_json::json;

/// Wrapper so the domain error can cross the axum boundary.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        // the whole validation/conflict/command family is caller error
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(status_of(&AppError::NotFound("post")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(&AppError::TooLongText), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(&AppError::ConflictingCursors),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AppError::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(&AppError::Internal("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
