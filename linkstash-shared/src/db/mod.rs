//! Database utilities
//!
//! - `pool`: PostgreSQL connection pool management
//! - `migrations`: Schema migration runner

pub mod migrations;
pub mod pool;

pub use pool::{close_pool, create_pool, DatabaseConfig};
