//! Pagination filter for the user list endpoint.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Caller-supplied page window. Absent fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UsersListFilter {
    /// 1-based page index
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: u64,
    /// Maximum number of users per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, default = 20)]
    pub page_size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl UsersListFilter {
    /// Build a filter, rejecting windows the store cannot address.
    pub fn new(page: u64, page_size: u64) -> AppResult<Self> {
        Self { page, page_size }.checked()
    }

    /// Validate a filter obtained from deserialization.
    ///
    /// Both values must be at least 1 and the resulting offset must fit in a `u64`.
    pub fn checked(self) -> AppResult<Self> {
        if self.page == 0 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(AppError::validation("pageSize must be at least 1"));
        }
        if (self.page - 1).checked_mul(self.page_size).is_none() {
            return Err(AppError::validation("page is out of range"));
        }
        Ok(self)
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Maximum number of rows to return
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for UsersListFilter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
