//! # TaskNest API Server Library
//!
//! HTTP front end for the TaskNest task manager.
//!
//! ## Modules
//!
//! - `app`: application state, router and JWT layer
//! - `config`: environment-driven configuration
//! - `error`: error type and HTTP response mapping
//! - `extract`: body, path and query extractors that reject with `ApiError`
//! - `middleware`: security headers
//! - `routes`: handlers per resource

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
