//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DomainError, Subscription, SubscriptionId, SubscriptionRepository};
use crate::infrastructure::subscription::{
    CreateSubscriptionRequest, SubscriptionService, TotalCostRequest,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub subscription_service: Arc<dyn SubscriptionServiceTrait>,
}

impl AppState {
    pub fn new(subscription_service: Arc<dyn SubscriptionServiceTrait>) -> Self {
        Self {
            subscription_service,
        }
    }
}

/// Trait for subscription service operations
#[async_trait::async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    async fn create(&self, request: CreateSubscriptionRequest)
        -> Result<Subscription, DomainError>;
    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError>;
    async fn list(&self, user_id: Option<&str>) -> Result<Vec<Subscription>, DomainError>;
    async fn delete(&self, id: SubscriptionId) -> Result<(), DomainError>;
    async fn total_cost(&self, request: TotalCostRequest) -> Result<i64, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: SubscriptionRepository + ?Sized + 'static> SubscriptionServiceTrait
    for SubscriptionService<R>
{
    async fn create(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, DomainError> {
        SubscriptionService::create(self, request).await
    }

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        SubscriptionService::get(self, id).await
    }

    async fn list(&self, user_id: Option<&str>) -> Result<Vec<Subscription>, DomainError> {
        SubscriptionService::list(self, user_id).await
    }

    async fn delete(&self, id: SubscriptionId) -> Result<(), DomainError> {
        SubscriptionService::delete(self, id).await
    }

    async fn total_cost(&self, request: TotalCostRequest) -> Result<i64, DomainError> {
        SubscriptionService::total_cost(self, request).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        SubscriptionService::ping(self).await
    }
}
