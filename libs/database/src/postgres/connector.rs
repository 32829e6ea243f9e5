use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, RetryConfig, retry_with_backoff};

/// Open a connection pool with the given options
pub async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Open a connection pool described by `config`
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    connect_with_options(config.into_connect_options()).await
}

/// Open a connection pool, retrying with exponential backoff
///
/// The retry budget comes from `config.connect_retries` unless `retry_config` overrides it.
///
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config_with_retry};
///
/// let config = PostgresConfig::from_env()?;
/// let db = connect_from_config_with_retry(config, None).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    let retry = retry_config
        .unwrap_or_else(|| RetryConfig::new().with_max_retries(config.connect_retries));
    let options = config.into_connect_options();

    retry_with_backoff(|| connect_with_options(options.clone()), retry).await
}

/// Apply all pending migrations of `M`
///
/// Failures are reported as [`DatabaseError::MigrationError`].
///
/// ```ignore
/// use migration::Migrator;
/// use database::postgres::run_migrations;
///
/// run_migrations::<Migrator>(&db, "products_worker").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DatabaseError> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{app_name}: {e}")))?;
    info!(app = app_name, "Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use sea_orm_migration::MigrationTrait;

    struct NoopMigrator;

    impl MigratorTrait for NoopMigrator {
        fn migrations() -> Vec<Box<dyn MigrationTrait>> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_run_migrations_reports_migration_error() {
        // Empty mock buffers make the first statement of the migrator fail
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = run_migrations::<NoopMigrator>(&db, "products_worker")
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::MigrationError(_)));
        assert!(err.to_string().contains("products_worker"));
    }
}
