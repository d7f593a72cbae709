//! Subscription domain
//!
//! Subscription records, the month-precision date codec used at the API
//! boundary, and the billing-window cost computation.

mod cost;
mod date;
mod entity;
mod repository;
mod window;

pub use cost::{billed_months, months_between, subscription_cost, total_cost, EffectiveEndPolicy};
pub use date::{format_month, parse_month, parse_stored_date, DateFormatError};
pub use entity::{NewSubscription, Subscription, SubscriptionId, MAX_SERVICE_NAME_LENGTH};
pub use repository::SubscriptionRepository;
pub use window::BillingWindow;

#[cfg(test)]
pub use repository::MockSubscriptionRepository;
