//! # Linkstash Shared Library
//!
//! This crate contains the storage, authentication, filtering, and search
//! mirror layers shared by the Linkstash API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and store operations (users, tokens, links,
//!   tags, settings)
//! - `auth`: Password hashing and opaque bearer-token primitives
//! - `db`: Connection pool and migration runner
//! - `filter`: In-memory tag/domain filtering and pagination
//! - `search`: Secondary full-text index mirror (document projection, query
//!   builder, client, background worker)

pub mod auth;
pub mod db;
pub mod filter;
pub mod models;
pub mod search;

/// Current version of the linkstash shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
