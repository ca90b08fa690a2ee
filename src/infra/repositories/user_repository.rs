//! User store: the relational implementation of the user capability.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::UsersListFilter;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User store trait for dependency injection.
///
/// Every mutation is durable once the call returns `Ok`. Operations that
/// target a single id fail with `AppError::NotFound` when no row matches.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return its assigned id
    async fn add_user(&self, name: String, email: String) -> AppResult<u64>;

    /// Fetch exactly one user
    async fn get_user(&self, id: u64) -> AppResult<User>;

    /// Fetch one page of users, ordered by ascending id
    async fn get_users_list(&self, filter: UsersListFilter) -> AppResult<Vec<User>>;

    /// Overwrite both name and email
    async fn update_user(&self, id: u64, name: String, email: String) -> AppResult<()>;

    /// Remove a user
    async fn delete_user(&self, id: u64) -> AppResult<()>;

    /// Round-trip a trivial statement through the pool
    async fn ping(&self) -> AppResult<()>;
}

/// Concrete implementation of UserRepository over a SeaORM connection pool
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Ids beyond the signed column range can never have been assigned.
fn row_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

#[async_trait]
impl UserRepository for UserStore {
    async fn add_user(&self, name: String, email: String) -> AppResult<u64> {
        const OP: &str = "UserStore.add_user";

        let active_model = ActiveModel {
            id: NotSet,
            name: Set(name),
            email: Set(email),
        };

        let result = UserEntity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(AppError::database(OP))?;

        u64::try_from(result.last_insert_id)
            .map_err(|_| AppError::internal(format!("{OP}: backend returned a negative id")))
    }

    async fn get_user(&self, id: u64) -> AppResult<User> {
        const OP: &str = "UserStore.get_user";

        let Some(row_id) = row_id(id) else {
            return Err(AppError::NotFound);
        };

        UserEntity::find_by_id(row_id)
            .one(&self.db)
            .await
            .map_err(AppError::database(OP))?
            .map(User::from)
            .ok_or_not_found()
    }

    async fn get_users_list(&self, filter: UsersListFilter) -> AppResult<Vec<User>> {
        const OP: &str = "UserStore.get_users_list";

        // Offsets past the signed range lie beyond any assignable id
        if row_id(filter.offset()).is_none() {
            return Ok(Vec::new());
        }
        let limit = filter.limit().min(i64::MAX as u64);

        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .offset(filter.offset())
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::database(OP))?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, id: u64, name: String, email: String) -> AppResult<()> {
        const OP: &str = "UserStore.update_user";

        let Some(row_id) = row_id(id) else {
            return Err(AppError::NotFound);
        };

        let result = UserEntity::update_many()
            .col_expr(user::Column::Name, Expr::value(name))
            .col_expr(user::Column::Email, Expr::value(email))
            .filter(user::Column::Id.eq(row_id))
            .exec(&self.db)
            .await
            .map_err(AppError::database(OP))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_user(&self, id: u64) -> AppResult<()> {
        const OP: &str = "UserStore.delete_user";

        let Some(row_id) = row_id(id) else {
            return Err(AppError::NotFound);
        };

        let result = UserEntity::delete_by_id(row_id)
            .exec(&self.db)
            .await
            .map_err(AppError::database(OP))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        const OP: &str = "UserStore.ping";

        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(AppError::database(OP))?;

        Ok(())
    }
}
