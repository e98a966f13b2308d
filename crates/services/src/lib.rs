//! murmur/crates/services/src/lib.rs
//!
//! The application services of Murmur: post creation, timeline assembly,
//! reply listing, drive reference resolution, and serialization. Pure
//! logic over the `domains` ports; no transport or storage code lives
//! here.

pub mod drive;
pub mod effects;
pub mod feed;
pub mod intent;
pub mod posting;
pub mod replies;
pub mod serialize;

pub use drive::{resolve_folder, DriveService, FolderRef, ResolveOptions};
pub use effects::SideEffects;
pub use feed::{FeedService, TimelineQuery};
pub use intent::{classify, CreatePost, PostIntent, MAX_FILE_COUNT, MAX_TEXT_LENGTH};
pub use posting::{CreateOutcome, PostingService};
pub use replies::{RepliesQuery, ReplyService};
pub use serialize::Serializer;
