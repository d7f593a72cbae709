//! Runtime storage backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::StorageSettings;
use crate::domain::{DomainError, SubscriptionRepository};
use crate::infrastructure::subscription::{
    load_seed_file, InMemorySubscriptionRepository, PostgresSubscriptionRepository,
};

use super::migrations::run_storage_migrations;
use super::postgres::{connect_pool, PostgresConfig};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Build the PostgreSQL configuration from settings
pub fn postgres_config(settings: &StorageSettings) -> Result<PostgresConfig, DomainError> {
    let url = settings
        .database_url
        .clone()
        .ok_or_else(|| DomainError::configuration("storage.database_url (or DATABASE_URL) is required for the postgres backend"))?;

    Ok(PostgresConfig::new(url)
        .with_max_connections(settings.max_connections)
        .with_min_connections(settings.min_connections)
        .with_connect_timeout(settings.connect_timeout_secs)
        .with_idle_timeout(settings.idle_timeout_secs))
}

/// Factory for the subscription repository
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates the subscription repository selected by the settings
    pub async fn create_subscription_repository(
        settings: &StorageSettings,
    ) -> Result<Arc<dyn SubscriptionRepository>, DomainError> {
        let backend = StorageType::from_str(&settings.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend '{}'", settings.backend))
        })?;

        info!("Storage backend: {:?}", backend);

        match backend {
            StorageType::InMemory => {
                let seed = match &settings.seed_file {
                    Some(path) => load_seed_file(path)?,
                    None => Vec::new(),
                };

                info!(count = seed.len(), "Using in-memory subscription storage");
                Ok(Arc::new(InMemorySubscriptionRepository::with_subscriptions(seed)))
            }
            StorageType::Postgres => {
                let config = postgres_config(settings)?;

                info!("Connecting to PostgreSQL...");
                let pool = connect_pool(&config).await?;
                info!("PostgreSQL connection established");

                if settings.run_migrations {
                    run_storage_migrations(&pool).await?;
                    info!("Storage migrations applied");
                }

                Ok(Arc::new(PostgresSubscriptionRepository::new(pool)))
            }
        }
    }
}
