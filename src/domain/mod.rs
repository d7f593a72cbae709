//! Domain layer - Core business logic and entities

pub mod error;
pub mod subscription;

pub use error::DomainError;
pub use subscription::{
    BillingWindow, EffectiveEndPolicy, NewSubscription, Subscription, SubscriptionId,
    SubscriptionRepository,
};
