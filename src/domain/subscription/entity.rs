//! Subscription entity and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Maximum length for service names
pub const MAX_SERVICE_NAME_LENGTH: usize = 255;

/// Store-assigned subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(i64);

impl SubscriptionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SubscriptionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A subscription that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    /// Flat monthly price in minor currency units
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    /// `None` while the subscription is still active
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn new(
        service_name: impl Into<String>,
        price: i64,
        user_id: Uuid,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            price,
            user_id,
            start_date,
            end_date: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Check the record before it reaches storage
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.service_name.trim().is_empty() {
            return Err(DomainError::validation("Service name cannot be empty"));
        }

        if self.service_name.len() > MAX_SERVICE_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Service name too long: {} characters (max {})",
                self.service_name.len(),
                MAX_SERVICE_NAME_LENGTH
            )));
        }

        if self.price < 0 {
            return Err(DomainError::validation(format!(
                "Price must be non-negative, got {}",
                self.price
            )));
        }

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(DomainError::format(format!(
                    "End date {} is before start date {}",
                    end_date, self.start_date
                )));
            }
        }

        Ok(())
    }
}

/// A persisted subscription record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a stored record from its write shape and store-assigned fields
    pub fn from_new(
        id: SubscriptionId,
        subscription: NewSubscription,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            service_name: subscription.service_name,
            price: subscription.price,
            user_id: subscription.user_id,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            created_at,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
