//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::UserRepository;

/// Application state shared across handlers.
///
/// Holds only a handle to the user store; handlers keep no state of their own.
#[derive(Clone)]
pub struct AppState {
    /// User store capability
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Create new application state around a user store.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}
