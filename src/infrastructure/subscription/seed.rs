//! Seed data loading for the in-memory store
//!
//! A seed file is a JSON array of records in stored form, with `start_date`
//! and `end_date` as `YYYY-MM-DD` (a date-time suffix is ignored).

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::subscription::{parse_stored_date, NewSubscription};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct SeedRecord {
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
}

impl SeedRecord {
    fn into_new_subscription(self) -> Result<NewSubscription, DomainError> {
        let start_date = parse_stored_date(&self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(parse_stored_date)
            .transpose()?;

        let mut subscription =
            NewSubscription::new(self.service_name, self.price, self.user_id, start_date);
        subscription.end_date = end_date;
        subscription.validate()?;

        Ok(subscription)
    }
}

/// Parse seed records from JSON text
pub fn parse_seed(json: &str) -> Result<Vec<NewSubscription>, DomainError> {
    let records: Vec<SeedRecord> = serde_json::from_str(json)
        .map_err(|e| DomainError::configuration(format!("Invalid seed data: {}", e)))?;

    records
        .into_iter()
        .map(SeedRecord::into_new_subscription)
        .collect()
}

/// Read and parse a seed file
pub fn load_seed_file(path: &str) -> Result<Vec<NewSubscription>, DomainError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        DomainError::configuration(format!("Failed to read seed file '{}': {}", path, e))
    })?;

    parse_seed(&json)
}
