//! Shared types.

mod pagination;

pub use pagination::UsersListFilter;
