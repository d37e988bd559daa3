//! Full-text search mirror
//!
//! The primary store (Postgres) is the source of truth. Every saved link is
//! mirrored into Elasticsearch as a denormalized [`document::LinkDocument`]
//! so the browse endpoint can run free-text queries. Mirroring is best-effort
//! and asynchronous; a lost update degrades search results, never data.

pub mod client;
pub mod document;
pub mod mirror;
pub mod query;

pub use client::{SearchClient, SearchError};
pub use document::LinkDocument;
pub use mirror::{spawn_mirror, MirrorHandle, MirrorStore, MirrorTask};
