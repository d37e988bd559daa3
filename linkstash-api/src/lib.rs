//! # Linkstash API Server
//!
//! HTTP surface for the Linkstash bookmark manager: authentication, link
//! and tag management, per-user settings, search-backed browsing, and
//! bookmark imports.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod query;
pub mod routes;
