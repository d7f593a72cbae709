//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations, returns how many were applied
    async fn run(&self) -> Result<usize, DomainError>;

    /// Reverts the last applied migration, returns its version
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version, strictly increasing
    pub version: i64,
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Collection of migrations for the storage layer
pub fn storage_migrations() -> Vec<Migration> {
    vec![Migration::new(
        1,
        "Create subscriptions table",
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id BIGSERIAL PRIMARY KEY,
            service_name TEXT NOT NULL,
            price BIGINT NOT NULL CHECK (price >= 0),
            user_id UUID NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (end_date IS NULL OR end_date >= start_date)
        );
        CREATE INDEX IF NOT EXISTS idx_subscriptions_user_service
            ON subscriptions(user_id, service_name);
        "#,
        r#"
        DROP TABLE IF EXISTS subscriptions;
        "#,
    )]
}

/// Versions from `migrations` that are not in `applied`, in order
pub fn pending_versions(migrations: &[Migration], applied: &[i64]) -> Vec<i64> {
    migrations
        .iter()
        .map(|m| m.version)
        .filter(|v| !applied.contains(v))
        .collect()
}

/// Applied and pending versions of a migration set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: Vec<i64>,
    pub pending: Vec<i64>,
}

impl MigrationStatus {
    pub fn new(migrations: &[Migration], applied: Vec<i64>) -> Self {
        let pending = pending_versions(migrations, &applied);
        Self { applied, pending }
    }
}

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, storage_migrations())
    }

    pub fn with_migrations(pool: PgPool, migrations: Vec<Migration>) -> Self {
        Self { pool, migrations }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Returns all applied migration versions
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT version FROM _migrations WHERE success = TRUE ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get applied migrations: {}", e)))
    }

    pub async fn status(&self) -> Result<MigrationStatus, DomainError> {
        let applied = self.applied_versions().await?;
        Ok(MigrationStatus::new(&self.migrations, applied))
    }

    /// Applies one migration, then records it
    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        sqlx::raw_sql(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        Ok(())
    }

    async fn unapply(&self, migration: &Migration) -> Result<(), DomainError> {
        sqlx::raw_sql(&migration.down)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<usize, DomainError> {
        let applied = self.applied_versions().await?;
        let pending = pending_versions(&self.migrations, &applied);

        for migration in self
            .migrations
            .iter()
            .filter(|m| pending.contains(&m.version))
        {
            info!(
                version = migration.version,
                description = %migration.description,
                "Applying migration"
            );
            self.apply(migration).await?;
        }

        Ok(pending.len())
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let Some(version) = self.version().await? else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| {
                DomainError::not_found(format!("Migration {} is not known to this build", version))
            })?;

        info!(version, description = %migration.description, "Reverting migration");
        self.unapply(migration).await?;

        Ok(Some(version))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Runs all pending storage migrations
pub async fn run_storage_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test", "DROP TABLE test");

        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
        assert_eq!(migration.down, "DROP TABLE test");
    }

    #[test]
    fn test_storage_migrations_order() {
        let migrations = storage_migrations();

        assert!(!migrations.is_empty());

        for pair in migrations.windows(2) {
            assert!(
                pair[1].version > pair[0].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_storage_migrations_content() {
        for migration in storage_migrations() {
            assert!(!migration.description.is_empty());
            assert!(!migration.up.trim().is_empty());
            assert!(!migration.down.trim().is_empty());
        }
    }

    #[test]
    fn test_subscriptions_schema() {
        let migrations = storage_migrations();
        let up = &migrations[0].up;

        assert!(up.contains("CREATE TABLE IF NOT EXISTS subscriptions"));
        assert!(up.contains("end_date DATE,"));
        assert!(up.contains("user_id UUID NOT NULL"));
    }

    #[test]
    fn test_pending_versions() {
        let migrations = vec![
            Migration::new(1, "one", "SELECT 1", "SELECT 1"),
            Migration::new(2, "two", "SELECT 2", "SELECT 2"),
            Migration::new(3, "three", "SELECT 3", "SELECT 3"),
        ];

        assert_eq!(pending_versions(&migrations, &[]), vec![1, 2, 3]);
        assert_eq!(pending_versions(&migrations, &[1, 2]), vec![3]);
        assert!(pending_versions(&migrations, &[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_migration_status() {
        let migrations = vec![
            Migration::new(1, "one", "SELECT 1", "SELECT 1"),
            Migration::new(2, "two", "SELECT 2", "SELECT 2"),
        ];

        let fresh = MigrationStatus::new(&migrations, vec![]);
        assert!(fresh.applied.is_empty());
        assert_eq!(fresh.pending, vec![1, 2]);

        let partial = MigrationStatus::new(&migrations, vec![1]);
        assert_eq!(partial.applied, vec![1]);
        assert_eq!(partial.pending, vec![2]);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_migrator_futures_are_send() {
        let pool = PgPool::connect_lazy("postgres://localhost/billing").unwrap();
        let migrator = PostgresMigrator::new(pool);

        let run = migrator.run();
        assert_send(&run);

        let revert = migrator.revert();
        assert_send(&revert);
    }
}
