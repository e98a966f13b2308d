//! murmur/crates/storage-adapters/src/lib.rs
//!
//! Infrastructure implementations of the `domains` ports: entity stores,
//! blob stores, and the broadcast event publisher. Everything beyond the
//! in-memory defaults is feature-gated, mirroring how the binary is
//! compiled to order.

pub mod blob;
pub mod events;
pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use blob::MemoryBlobStore;
#[cfg(feature = "media-local")]
pub use blob::LocalBlobStore;
pub use events::{BroadcastPublisher, StreamEvent};
pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
