//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::subscription::{
    BillingWindow, NewSubscription, Subscription, SubscriptionId, SubscriptionRepository,
};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str =
    "SELECT id, service_name, price, user_id, start_date, end_date, created_at FROM subscriptions";

/// PostgreSQL implementation of SubscriptionRepository
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create subscription: {}", e)))?;

        let id: i64 = get_column(&row, "id")?;
        let created_at: DateTime<Utc> = get_column(&row, "created_at")?;

        Ok(Subscription::from_new(
            SubscriptionId::new(id),
            subscription,
            created_at,
        ))
    }

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get subscription: {}", e)))?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Subscription>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list subscriptions: {}", e)))?;

        rows.iter().map(row_to_subscription).collect()
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete subscription: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_overlapping(
        &self,
        window: &BillingWindow,
    ) -> Result<Vec<Subscription>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            {}
            WHERE user_id = $1
              AND ($2::text IS NULL OR service_name = $2)
              AND start_date <= $4
              AND (end_date IS NULL OR end_date >= $3)
            ORDER BY id
            "#,
            SELECT_COLUMNS
        ))
        .bind(window.user_id())
        .bind(window.service_name())
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to query subscriptions: {}", e)))?;

        rows.iter().map(row_to_subscription).collect()
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

fn get_column<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| DomainError::storage(format!("Invalid '{}' column: {}", column, e)))
}

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Result<Subscription, DomainError> {
    let id: i64 = get_column(row, "id")?;
    let service_name: String = get_column(row, "service_name")?;
    let price: i64 = get_column(row, "price")?;
    let user_id: Uuid = get_column(row, "user_id")?;
    let start_date: NaiveDate = get_column(row, "start_date")?;
    let end_date: Option<NaiveDate> = get_column(row, "end_date")?;
    let created_at: DateTime<Utc> = get_column(row, "created_at")?;

    let mut subscription = NewSubscription::new(service_name, price, user_id, start_date);
    subscription.end_date = end_date;

    Ok(Subscription::from_new(
        SubscriptionId::new(id),
        subscription,
        created_at,
    ))
}
