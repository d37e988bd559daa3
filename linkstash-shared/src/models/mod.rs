//! Database models and store operations
//!
//! Each model is a plain struct with inherent async CRUD operations taking a
//! `&PgPool`. All link/tag/setting operations are scoped to an owner; an id
//! owned by another user is indistinguishable from a missing id.

pub mod auth_token;
pub mod link;
pub mod setting;
pub mod tag;
pub mod user;
