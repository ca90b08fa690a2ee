//! Users API - CRUD service for user records
//!
//! A small REST service that stores users in a relational database
//! and exposes create, read, list, update and delete over HTTP.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: The `User` record
//! - **infra**: Database pool, migrations and the user store
//! - **api**: HTTP handlers, extractors and routes
//! - **types**: Shared types (pagination filter)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::User;
pub use errors::{AppError, AppResult};
pub use infra::{UserRepository, UserStore};
