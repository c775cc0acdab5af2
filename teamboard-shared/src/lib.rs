//! # TeamBoard Shared Library
//!
//! Domain types, persistence and business rules used by the TeamBoard API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and SQL for users, workspaces, members,
//!   projects, board columns and tasks
//! - `auth`: Password hashing, JWT, bearer resolution and the workspace
//!   access predicate
//! - `db`: Connection pool and migrations
//! - `store`: The `Store` trait with PostgreSQL and in-memory backends
//! - `services`: Lifecycle rules for each entity

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TeamBoard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
