//! HTTP route handlers

pub mod auth;
pub mod health;
pub mod import;
pub mod links;
pub mod settings;
pub mod tags;
