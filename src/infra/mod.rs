//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection pool and migrations
//! - The relational user store

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
