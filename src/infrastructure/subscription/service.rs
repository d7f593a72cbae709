//! Subscription service - record operations and billing totals

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::subscription::{
    parse_month, total_cost, BillingWindow, EffectiveEndPolicy, NewSubscription, Subscription,
    SubscriptionId, SubscriptionRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_total_cost_query;

/// Request for creating a new subscription, dates in `MM-YYYY`
#[derive(Debug, Clone)]
pub struct CreateSubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// Request for a billing total, dates in `MM-YYYY`
#[derive(Debug, Clone)]
pub struct TotalCostRequest {
    pub user_id: String,
    /// Empty or absent matches every service
    pub service_name: Option<String>,
    pub start: String,
    pub end: String,
}

/// Subscription service
#[derive(Debug)]
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repository: Arc<R>,
    policy: EffectiveEndPolicy,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    /// Create a new subscription service using the default end policy
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_policy(repository, EffectiveEndPolicy::default())
    }

    /// Create a new subscription service with an explicit end policy
    pub fn with_policy(repository: Arc<R>, policy: EffectiveEndPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> EffectiveEndPolicy {
        self.policy
    }

    /// Create a subscription
    pub async fn create(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, DomainError> {
        let user_id = parse_user_id(&request.user_id)?;
        let start_date = parse_month(&request.start_date)?;
        let end_date = request.end_date.as_deref().map(parse_month).transpose()?;

        let mut subscription =
            NewSubscription::new(request.service_name, request.price, user_id, start_date);
        subscription.end_date = end_date;
        subscription.validate()?;

        let created = self.repository.insert(subscription).await?;

        info!(
            id = %created.id(),
            user_id = %created.user_id(),
            service = %created.service_name(),
            "Subscription created"
        );

        Ok(created)
    }

    /// Get a subscription by ID
    pub async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        self.repository.get(id).await
    }

    /// List subscriptions, optionally for a single user
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Subscription>, DomainError> {
        let user_id = user_id.map(parse_user_id).transpose()?;
        self.repository.list(user_id).await
    }

    /// Delete a subscription
    pub async fn delete(&self, id: SubscriptionId) -> Result<(), DomainError> {
        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!(
                "Subscription '{}' not found",
                id
            )));
        }

        info!(id = %id, "Subscription deleted");
        Ok(())
    }

    /// Total prorated cost of a user's subscriptions over a month window
    pub async fn total_cost(&self, request: TotalCostRequest) -> Result<i64, DomainError> {
        let user_id = parse_user_id(&request.user_id)?;
        let start = parse_month(&request.start)?;
        let end = parse_month(&request.end)?;

        let mut window = BillingWindow::new(user_id, start, end)?;
        if let Some(service_name) = request.service_name {
            window = window.with_service(service_name);
        }

        let candidates = self.repository.find_overlapping(&window).await?;
        debug!(candidates = candidates.len(), policy = %self.policy, "Computing total cost");

        let total = total_cost(&candidates, &window, self.policy)?;
        record_total_cost_query(window.service_name().is_some());

        info!(
            user_id = %user_id,
            service = window.service_name().unwrap_or(""),
            start = %request.start,
            end = %request.end,
            total,
            "Total cost calculated"
        );

        Ok(total)
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}

fn parse_user_id(value: &str) -> Result<Uuid, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation("user_id is required"));
    }

    Uuid::parse_str(value)
        .map_err(|e| DomainError::validation(format!("Invalid user_id '{}': {}", value, e)))
}
