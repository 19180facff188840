use chrono::{DateTime, Utc};
use serde::Deserialize;

use db::models::subscription::{Category, Currency, Frequency, SubscriptionStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: String,
    pub status: Option<SubscriptionStatus>,
    pub start_date: DateTime<Utc>,
    pub renewal_date: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    pub payment_method: Option<String>,
    pub status: Option<SubscriptionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub renewal_date: Option<DateTime<Utc>>,
}
