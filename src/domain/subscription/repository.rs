//! Subscription repository trait

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewSubscription, Subscription, SubscriptionId};
use super::window::BillingWindow;
use crate::domain::DomainError;

/// Repository for subscription persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persist a new subscription and return it with its assigned ID
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, DomainError>;

    /// Get a subscription by ID
    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// List subscriptions ordered by ID, optionally for one user only
    async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Subscription>, DomainError>;

    /// Delete a subscription, returns true if a record was removed
    async fn delete(&self, id: SubscriptionId) -> Result<bool, DomainError>;

    /// Subscriptions of the window's user and service whose active interval
    /// can intersect the window
    async fn find_overlapping(
        &self,
        window: &BillingWindow,
    ) -> Result<Vec<Subscription>, DomainError>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}
