use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::subscription::{Category, Currency, Frequency, SubscriptionStatus};

/// Fully-resolved insert payload: renewal derivation and status forcing
/// have already run by the time this reaches the database.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
    pub user_id: Uuid,
}

/// The merged column set written back on update. Ownership and identity
/// columns are immutable and deliberately absent.
#[derive(Debug, Clone)]
pub struct SubscriptionChanges {
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
}
