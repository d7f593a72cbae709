//! Billing-period cost computation
//!
//! A subscription is billed a flat price for every calendar month it is
//! active inside the window, counting both boundary months. Month counts use
//! calendar-age semantics: whole years and whole months elapsed, where a
//! partial month never counts.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use super::entity::Subscription;
use super::window::BillingWindow;
use crate::domain::DomainError;

/// How the last billed month is chosen for subscriptions that end after the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveEndPolicy {
    /// Bill up to the subscription end, capped at the window end
    #[default]
    Clamped,
    /// Bill up to the subscription end even past the window end.
    /// Months after the window are charged too.
    Uncapped,
}

impl EffectiveEndPolicy {
    /// Last billed date for a subscription ending at `end_date` within a window ending at `window_end`
    pub fn effective_end(self, end_date: Option<NaiveDate>, window_end: NaiveDate) -> NaiveDate {
        match (self, end_date) {
            (_, None) => window_end,
            (Self::Clamped, Some(end)) => end.min(window_end),
            (Self::Uncapped, Some(end)) => end,
        }
    }
}

impl std::fmt::Display for EffectiveEndPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clamped => write!(f, "clamped"),
            Self::Uncapped => write!(f, "uncapped"),
        }
    }
}

/// Whole calendar months elapsed from `from` to `to`; negative when `to` is earlier
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -months_between(to, from);
    }

    let years = i64::from(to.year() - from.year());
    let mut months = years * 12 + i64::from(to.month()) - i64::from(from.month());

    if to.day() < from.day() {
        months -= 1;
    }

    months
}

/// Months billed for an interval, inclusive of both boundary months. Never negative.
pub fn billed_months(start: NaiveDate, end: NaiveDate) -> i64 {
    (months_between(start, end) + 1).max(0)
}

/// Cost of one candidate subscription over the window
pub fn subscription_cost(
    subscription: &Subscription,
    window: &BillingWindow,
    policy: EffectiveEndPolicy,
) -> Result<i64, DomainError> {
    let effective_start = subscription.start_date().max(window.start());
    let effective_end = policy.effective_end(subscription.end_date(), window.end());
    let months = billed_months(effective_start, effective_end);

    subscription.price().checked_mul(months).ok_or_else(|| {
        DomainError::internal(format!(
            "Cost overflow for subscription {}",
            subscription.id()
        ))
    })
}

/// Sum of prorated costs over the candidates; zero when there are none
pub fn total_cost(
    candidates: &[Subscription],
    window: &BillingWindow,
    policy: EffectiveEndPolicy,
) -> Result<i64, DomainError> {
    candidates.iter().try_fold(0i64, |total, subscription| {
        let cost = subscription_cost(subscription, window, policy)?;
        total
            .checked_add(cost)
            .ok_or_else(|| DomainError::internal("Total cost overflow"))
    })
}
