//! Storage infrastructure - Backend selection, pooling and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{postgres_config, StorageFactory, StorageType};
pub use migrations::{
    run_storage_migrations, Migration, MigrationStatus, Migrator, PostgresMigrator,
};
pub use postgres::{connect_pool, PostgresConfig};
