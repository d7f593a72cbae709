//! Subscription infrastructure - storage implementations and service

mod in_memory;
mod postgres_repository;
mod seed;
mod service;

pub use in_memory::InMemorySubscriptionRepository;
pub use postgres_repository::PostgresSubscriptionRepository;
pub use seed::{load_seed_file, parse_seed};
pub use service::{CreateSubscriptionRequest, SubscriptionService, TotalCostRequest};
