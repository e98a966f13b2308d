//! Request classification for the posting pipeline.
//!
//! Raw creation parameters are resolved *once* into a tagged intent, and
//! the downstream pipeline branches on the variant instead of re-probing
//! strings. Classification is pure: it parses and normalizes, but never
//! touches a store.

use domains::{AppError, Result};
use uuid::Uuid;

/// 最大文字数: maximum body length in chars, after trimming.
pub const MAX_TEXT_LENGTH: usize = 300;

/// 添付できるファイルの数: maximum number of attached files, after dedup.
pub const MAX_FILE_COUNT: usize = 4;

/// Leading sentinel that turns a post body into an embedded command.
const COMMAND_SENTINEL: char = '$';

/// Raw creation parameters as they arrive from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct CreatePost {
    pub repost: Option<Uuid>,
    pub text: Option<String>,
    pub reply_to: Option<Uuid>,
    /// Comma-separated drive file ids.
    pub files: Option<String>,
}

/// What the caller actually asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum PostIntent {
    /// Sole content is a reference to another post.
    Repost { target: Uuid },
    /// Embedded `$name argument` command. No post is created.
    Command { name: String, argument: String },
    /// A content post and/or reply.
    Content {
        text: Option<String>,
        reply_to: Option<Uuid>,
        /// Parsed, deduplicated, order-preserving. `None` when the
        /// parameter was absent or held no ids.
        files: Option<Vec<Uuid>>,
    },
}

/// Classifies raw parameters. Branch precedence: `repost` wins over
/// everything; otherwise a trimmed body starting with `$` is a command
/// (checked before the length limit, so an overlong command line still
/// dispatches); otherwise content/reply.
pub fn classify(raw: CreatePost) -> Result<PostIntent> {
    if let Some(target) = raw.repost {
        return Ok(PostIntent::Repost { target });
    }

    let text = match raw.text.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(trimmed) => {
            if let Some(rest) = trimmed.strip_prefix(COMMAND_SENTINEL) {
                return Ok(parse_command(rest));
            }
            if trimmed.chars().count() > MAX_TEXT_LENGTH {
                return Err(AppError::TooLongText);
            }
            Some(trimmed.to_string())
        }
    };

    let files = match raw.files.as_deref() {
        Some(csv) => parse_file_ids(csv)?,
        None => None,
    };

    Ok(PostIntent::Content {
        text,
        reply_to: raw.reply_to,
        files,
    })
}

/// `<name> <argument>` split on the first space. A bare sentinel word with
/// no space yields an empty command name, which the dispatcher rejects as
/// unknown.
fn parse_command(rest: &str) -> PostIntent {
    match rest.split_once(' ') {
        Some((name, argument)) => PostIntent::Command {
            name: name.to_string(),
            argument: argument.to_string(),
        },
        None => PostIntent::Command {
            name: String::new(),
            argument: String::new(),
        },
    }
}

/// Parses the comma-separated id list, discarding empty segments and
/// deduplicating while preserving first occurrence.
fn parse_file_ids(csv: &str) -> Result<Option<Vec<Uuid>>> {
    let mut ids: Vec<Uuid> = Vec::new();
    for part in csv.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse::<Uuid>()
            .map_err(|_| AppError::Validation(format!("invalid file id: {part}")))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(if ids.is_empty() { None } else { Some(ids) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repost_wins_over_everything() {
        let target = Uuid::now_v7();
        let intent = classify(CreatePost {
            repost: Some(target),
            text: Some("ignored".into()),
            reply_to: Some(Uuid::now_v7()),
            files: None,
        })
        .unwrap();
        assert_eq!(intent, PostIntent::Repost { target });
    }

    #[test]
    fn text_is_trimmed_and_empty_becomes_absent() {
        let intent = classify(CreatePost {
            text: Some("   ".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            intent,
            PostIntent::Content { text: None, files: None, .. }
        ));

        let intent = classify(CreatePost {
            text: Some("  hello  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            intent,
            PostIntent::Content { text: Some(t), .. } if t == "hello"
        ));
    }

    #[test]
    fn overlong_text_is_rejected() {
        let err = classify(CreatePost {
            text: Some("a".repeat(MAX_TEXT_LENGTH + 1)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::TooLongText));

        // exactly at the limit is fine
        classify(CreatePost {
            text: Some("a".repeat(MAX_TEXT_LENGTH)),
            ..Default::default()
        })
        .unwrap();
    }

    #[test]
    fn command_dispatch_precedes_length_check() {
        // An overlong command line is still a command, not a TooLongText.
        let intent = classify(CreatePost {
            text: Some(format!("$write {}", "x".repeat(400))),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            intent,
            PostIntent::Command { name, .. } if name == "write"
        ));
    }

    #[test]
    fn bare_sentinel_word_has_empty_command_name() {
        let intent = classify(CreatePost {
            text: Some("$write".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            intent,
            PostIntent::Command { name, .. } if name.is_empty()
        ));
    }

    #[test]
    fn file_ids_are_deduplicated_preserving_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let intent = classify(CreatePost {
            files: Some(format!("{a},{a},{b}")),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            intent,
            PostIntent::Content { files: Some(ids), .. } if ids == vec![a, b]
        ));
    }

    #[test]
    fn empty_file_segments_are_discarded() {
        let intent = classify(CreatePost {
            files: Some(",,".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(intent, PostIntent::Content { files: None, .. }));
    }

    #[test]
    fn malformed_file_id_is_a_validation_error() {
        let err = classify(CreatePost {
            files: Some("not-a-uuid".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
