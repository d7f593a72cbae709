//! Billing query window

use chrono::NaiveDate;
use uuid::Uuid;

use super::entity::Subscription;
use super::date::format_month;
use crate::domain::DomainError;

/// The user, optional service and month range a total is computed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingWindow {
    user_id: Uuid,
    service_name: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingWindow {
    /// Create a window covering every service of a user; `start` must not be after `end`
    pub fn new(user_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::format(format!(
                "Window start {} is after window end {}",
                format_month(start),
                format_month(end)
            )));
        }

        Ok(Self {
            user_id,
            service_name: None,
            start,
            end,
        })
    }

    /// Restrict the window to one service. An empty name keeps every service.
    pub fn with_service(mut self, service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        self.service_name = if service_name.is_empty() {
            None
        } else {
            Some(service_name)
        };
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether the subscription's active interval can intersect this window
    pub fn matches(&self, subscription: &Subscription) -> bool {
        subscription.user_id() == self.user_id
            && self
                .service_name
                .as_deref()
                .is_none_or(|name| subscription.service_name() == name)
            && subscription.start_date() <= self.end
            && subscription.end_date().is_none_or(|end| end >= self.start)
    }
}
