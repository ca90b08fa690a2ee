//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    tracing::info!(action = ?args.action, "Running migration command...");

    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    run(&db, args.action).await?;

    db.close()
        .await
        .map_err(|e| AppError::internal(e.to_string()))
}

async fn run(db: &Database, action: MigrateAction) -> AppResult<()> {
    match action {
        MigrateAction::Up => {
            db.run_migrations()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Migrations completed successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            let status = db
                .migration_status()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            for (name, applied) in status {
                let status_str = if applied { "applied" } else { "pending" };
                println!("{}: {}", name, status_str);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            db.fresh_migrations()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Fresh migrations completed successfully");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::DatabaseConfig;

    use super::*;

    async fn sqlite() -> Database {
        Database::connect_without_migrations(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..DatabaseConfig::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn up_then_down_toggles_status() {
        let db = sqlite().await;

        run(&db, MigrateAction::Up).await.unwrap();
        assert!(db.migration_status().await.unwrap().iter().all(|(_, applied)| *applied));

        run(&db, MigrateAction::Down).await.unwrap();
        assert!(db.migration_status().await.unwrap().iter().all(|(_, applied)| !*applied));
    }

    #[tokio::test]
    async fn connection_failure_keeps_cause() {
        let config = Config {
            database: DatabaseConfig {
                url: "sqlite:/definitely/not/here/users.db".to_string(),
                max_connections: 1,
                min_connections: 1,
                ..DatabaseConfig::default()
            },
            ..Config::default()
        };

        let err = execute(MigrateArgs { action: MigrateAction::Up }, config)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Database connection failed"), "{message}");
    }

    #[tokio::test]
    async fn fresh_leaves_everything_applied() {
        let db = sqlite().await;

        run(&db, MigrateAction::Fresh).await.unwrap();
        run(&db, MigrateAction::Status).await.unwrap();

        assert!(db.migration_status().await.unwrap().iter().all(|(_, applied)| *applied));
    }
}
