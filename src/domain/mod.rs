//! Domain layer - Core business entities
//!
//! This module contains the domain model independent of
//! infrastructure concerns (HTTP, database).

pub mod user;

pub use user::User;
