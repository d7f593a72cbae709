//! Subscription Billing API
//!
//! Tracks user subscriptions and answers billing questions such as
//! "how much did this user spend on this service between two months":
//! - Month-precision (`MM-YYYY`) date codec at the API boundary
//! - Overlap filtering and inclusive month proration of flat monthly prices
//! - PostgreSQL or in-memory storage, selected by configuration

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::storage::StorageFactory;
use infrastructure::subscription::SubscriptionService;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = StorageFactory::create_subscription_repository(&config.storage).await?;
    let service = SubscriptionService::with_policy(repository, config.billing.effective_end);

    info!(policy = %service.policy(), "Subscription service initialized");

    Ok(AppState::new(Arc::new(service)))
}
