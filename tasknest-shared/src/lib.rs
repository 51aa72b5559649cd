//! # TaskNest shared library
//!
//! Domain types, persistence and business rules behind the TaskNest API.
//! The HTTP layer in `tasknest-api` only parses requests, calls into
//! `services` and serializes the result.
//!
//! ## Module Organization
//!
//! - `models`: row types and their SQL
//! - `store`: the `Store` trait with PostgreSQL and in-memory backends
//! - `query`: task filter, sort and pagination builder
//! - `completion`: task completion state machine
//! - `stats`: dashboard aggregation
//! - `ownership`: per-user access guards
//! - `projection`: response shapes
//! - `services`: use-case functions over a `Store`
//! - `auth`: password hashing, JWT and bearer-token parsing
//! - `db`: connection pool and migrations
//! - `error`: store and service error types

pub mod auth;
pub mod completion;
pub mod db;
pub mod error;
pub mod models;
pub mod ownership;
pub mod projection;
pub mod query;
pub mod services;
pub mod stats;
pub mod store;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
