//! # Artloop API Server Library
//!
//! This library provides the core functionality for the Artloop API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mailer`: Outgoing mail collaborator (password reset links)
//! - `uploads`: Multipart image intake and storage
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod uploads;
