//! # Artloop Shared Library
//!
//! This crate contains the database models, authentication primitives, and
//! database utilities shared by the Artloop API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, extraction middleware, ownership guard
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Artloop shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
