//! Authentication primitives
//!
//! - `password`: Argon2id password hashing and verification
//! - `token`: opaque bearer-token generation and digesting

pub mod password;
pub mod token;
