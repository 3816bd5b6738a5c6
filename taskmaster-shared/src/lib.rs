//! # TaskMaster Shared Library
//!
//! Shared types and business logic used by the TaskMaster API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, categories, tasks)
//! - `auth`: Authentication and authorization core (passwords, JWTs,
//!   reset tokens, revocation, ownership checks)
//! - `db`: Database pool and migration helpers

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskMaster shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
