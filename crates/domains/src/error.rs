//! # AppError
//!
//! Centralized error handling for the Murmur ecosystem.
//! Every error here is detected *before* the persistent write of the branch
//! that would perform one, so a validation failure never leaves a partial
//! post behind.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced entity absent (post, file, folder, user)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Post body exceeds the 300-char limit after trimming
    #[error("too long text")]
    TooLongText,

    /// More than 4 attachments after deduplication
    #[error("too many files")]
    TooManyFiles,

    /// Neither text nor files on a content post
    #[error("text or files is required")]
    MissingContent,

    /// Repost target is itself a repost
    #[error("cannot repost from repost")]
    RepostOfRepost,

    /// Reply target is a repost
    #[error("cannot reply to repost")]
    ReplyToRepost,

    /// Pagination limit outside 1..=100
    #[error("invalid limit range")]
    InvalidLimitRange,

    /// Mutually exclusive cursors supplied together
    #[error("cannot set since_id and max_id")]
    ConflictingCursors,

    /// Unrecognized embedded `$` command
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Other malformed input (bad file id, folder chain too deep, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor could not be resolved from the request credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (store down, publish failed, ...)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a collaborator failure. Used at the service/store seam where
    /// `anyhow` errors cross into the domain taxonomy.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }

    /// Machine-readable reason string carried in error payloads alongside
    /// the human-readable message.
    pub fn code(&self) -> String {
        match self {
            AppError::NotFound(entity) => format!("{}_NOT_FOUND", entity.to_uppercase()),
            AppError::TooLongText => "TOO_LONG_TEXT".into(),
            AppError::TooManyFiles => "TOO_MANY_FILES".into(),
            AppError::MissingContent => "EMPTY_TEXT_AND_FILES".into(),
            AppError::RepostOfRepost => "REPOST_OF_REPOST".into(),
            AppError::ReplyToRepost => "REPLY_TO_REPOST".into(),
            AppError::InvalidLimitRange => "INVALID_LIMIT_RANGE".into(),
            AppError::ConflictingCursors => "CONFLICTING_CURSORS".into(),
            AppError::UnknownCommand(_) => "UNKNOWN_COMMAND".into(),
            AppError::Validation(_) => "INVALID_PARAM".into(),
            AppError::Unauthorized(_) => "UNAUTHORIZED".into(),
            AppError::Internal(_) => "INTERNAL_ERROR".into(),
        }
    }
}

/// A specialized Result type for Murmur logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_code_names_the_entity() {
        assert_eq!(AppError::NotFound("post").code(), "POST_NOT_FOUND");
        assert_eq!(AppError::NotFound("file").code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn messages_match_the_wire_contract() {
        assert_eq!(AppError::TooLongText.to_string(), "too long text");
        assert_eq!(
            AppError::MissingContent.to_string(),
            "text or files is required"
        );
        assert_eq!(
            AppError::ConflictingCursors.to_string(),
            "cannot set since_id and max_id"
        );
    }
}
