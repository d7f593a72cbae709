//! In-memory subscription repository implementation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::subscription::{
    BillingWindow, NewSubscription, Subscription, SubscriptionId, SubscriptionRepository,
};
use crate::domain::DomainError;

/// In-memory implementation of SubscriptionRepository
#[derive(Debug)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<BTreeMap<SubscriptionId, Subscription>>>,
    /// Last assigned ID
    last_id: AtomicI64,
}

impl InMemorySubscriptionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::with_subscriptions(Vec::new())
    }

    /// Create a repository with initial subscriptions, assigning IDs in order
    pub fn with_subscriptions(subscriptions: Vec<NewSubscription>) -> Self {
        let now = Utc::now();
        let mut map = BTreeMap::new();
        let mut last_id = 0;

        for subscription in subscriptions {
            last_id += 1;
            let id = SubscriptionId::new(last_id);
            map.insert(id, Subscription::from_new(id, subscription, now));
        }

        Self {
            subscriptions: Arc::new(RwLock::new(map)),
            last_id: AtomicI64::new(last_id),
        }
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, DomainError> {
        let id = SubscriptionId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Subscription::from_new(id, subscription, Utc::now());

        self.subscriptions.write().await.insert(id, stored.clone());

        Ok(stored)
    }

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(&id).cloned())
    }

    async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;

        Ok(subscriptions
            .values()
            .filter(|s| user_id.is_none_or(|user| s.user_id() == user))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, DomainError> {
        Ok(self.subscriptions.write().await.remove(&id).is_some())
    }

    async fn find_overlapping(
        &self,
        window: &BillingWindow,
    ) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;

        Ok(subscriptions
            .values()
            .filter(|s| window.matches(s))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_subscription(user_id: Uuid, service: &str) -> NewSubscription {
        NewSubscription::new(service, 500, user_id, date(2024, 2, 1)).with_end_date(date(2024, 3, 1))
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        let first = repo.insert(new_subscription(user, "Netflix")).await.unwrap();
        let second = repo.insert(new_subscription(user, "Spotify")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_seeded_ids_continue() {
        let user = Uuid::new_v4();
        let repo = InMemorySubscriptionRepository::with_subscriptions(vec![
            new_subscription(user, "Netflix"),
            new_subscription(user, "Spotify"),
        ]);

        let inserted = repo.insert(new_subscription(user, "Disney")).await.unwrap();
        assert_eq!(inserted.id().value(), 3);
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo
            .insert(new_subscription(Uuid::new_v4(), "Spotify"))
            .await
            .unwrap();

        let fetched = repo.get(created.id()).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));

        assert!(repo.delete(created.id()).await.unwrap());
        assert!(!repo.delete(created.id()).await.unwrap());
        assert!(repo.get(created.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let repo = InMemorySubscriptionRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.insert(new_subscription(alice, "Netflix")).await.unwrap();
        repo.insert(new_subscription(bob, "Netflix")).await.unwrap();
        repo.insert(new_subscription(alice, "Spotify")).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 3);

        let alice_subs = repo.list(Some(alice)).await.unwrap();
        assert_eq!(alice_subs.len(), 2);
        assert!(alice_subs.iter().all(|s| s.user_id() == alice));
        assert!(alice_subs[0].id() < alice_subs[1].id());
    }

    #[tokio::test]
    async fn test_find_overlapping_excludes_non_overlapping() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        repo.insert(
            NewSubscription::new("Netflix", 100, user, date(2024, 1, 1))
                .with_end_date(date(2024, 2, 1)),
        )
        .await
        .unwrap();
        repo.insert(NewSubscription::new("Spotify", 100, user, date(2024, 5, 1)))
            .await
            .unwrap();

        let window = BillingWindow::new(user, date(2024, 6, 1), date(2024, 7, 1)).unwrap();
        let candidates = repo.find_overlapping(&window).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].service_name(), "Spotify");
    }
}
