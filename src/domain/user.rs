//! User domain entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Server-assigned identifier, immutable once created
    #[schema(example = 1, minimum = 1)]
    pub id: u64,
    /// Display name
    #[schema(example = "Alice")]
    pub name: String,
    /// Email address, unique across all users
    #[schema(example = "alice@example.com")]
    pub email: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}
