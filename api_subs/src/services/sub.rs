use chrono::{DateTime, Duration, Utc};
use common::error::{AppError, Res};
use sqlx::PgPool;
use uuid::Uuid;

use db::{
    dtos::subscription::{NewSubscription, SubscriptionChanges},
    models::subscription::{Frequency, Subscription, SubscriptionStatus},
};

use crate::dtos::sub::{CreateSubscriptionRequest, UpdateSubscriptionRequest};

/// One billing period past the start date, by the calendar approximation
/// (daily=1, weekly=7, monthly=30, yearly=365 days).
pub fn derive_renewal_date(start_date: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    start_date + Duration::days(frequency.renewal_period_days())
}

pub async fn create_subscription(
    pool: &PgPool,
    owner: Uuid,
    req: CreateSubscriptionRequest,
) -> Res<Subscription> {
    let data = resolve_new_subscription(owner, req, Utc::now())?;
    db::subscription::insert_subscription(pool, data).await
}

pub async fn update_subscription(
    pool: &PgPool,
    caller: Uuid,
    id: Uuid,
    req: UpdateSubscriptionRequest,
) -> Res<Subscription> {
    let existing = get_owned(pool, caller, id, "update").await?;
    let changes = resolve_changes(&existing, req, Utc::now())?;
    db::subscription::update_subscription(pool, id, changes).await
}

pub async fn delete_subscription(pool: &PgPool, caller: Uuid, id: Uuid) -> Res<()> {
    get_owned(pool, caller, id, "delete").await?;
    db::subscription::delete_subscription(pool, id).await
}

/// Pure status transition; the renewal date is left alone.
pub async fn cancel_subscription(pool: &PgPool, caller: Uuid, id: Uuid) -> Res<Subscription> {
    get_owned(pool, caller, id, "cancel").await?;
    db::subscription::set_status(pool, id, SubscriptionStatus::Cancelled).await
}

/// Loads a subscription and verifies the caller owns it.
async fn get_owned(pool: &PgPool, caller: Uuid, id: Uuid, action: &str) -> Res<Subscription> {
    let subscription = db::subscription::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

    if subscription.user_id != caller {
        return Err(AppError::Forbidden(format!(
            "You are not authorized to {} this subscription",
            action
        )));
    }
    Ok(subscription)
}

/// Applies creation rules: field validation, renewal derivation when no
/// explicit date was given, and the expired-status forcing.
fn resolve_new_subscription(
    owner: Uuid,
    req: CreateSubscriptionRequest,
    now: DateTime<Utc>,
) -> Res<NewSubscription> {
    let name = req.name.trim().to_string();
    let payment_method = req.payment_method.trim().to_string();
    validate_fields(&name, req.price, &payment_method, req.start_date, now)?;

    let renewal_date = req
        .renewal_date
        .unwrap_or_else(|| derive_renewal_date(req.start_date, req.frequency));

    let mut status = req.status.unwrap_or_default();
    if renewal_date < req.start_date {
        status = SubscriptionStatus::Expired;
    }

    Ok(NewSubscription {
        name,
        price: req.price,
        currency: req.currency,
        frequency: req.frequency,
        category: req.category,
        payment_method,
        status,
        start_date: req.start_date,
        renewal_date,
        user_id: owner,
    })
}

/// Merges a partial update onto the stored record and re-runs the creation
/// rules. An explicit renewal date in the payload wins; otherwise the date
/// is re-derived from the merged start date and frequency.
fn resolve_changes(
    existing: &Subscription,
    req: UpdateSubscriptionRequest,
    now: DateTime<Utc>,
) -> Res<SubscriptionChanges> {
    let name = req
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| existing.name.clone());
    let price = req.price.unwrap_or(existing.price);
    let currency = req.currency.unwrap_or(existing.currency);
    let frequency = req.frequency.unwrap_or(existing.frequency);
    let category = req.category.unwrap_or(existing.category);
    let payment_method = req
        .payment_method
        .map(|p| p.trim().to_string())
        .unwrap_or_else(|| existing.payment_method.clone());
    let start_date = req.start_date.unwrap_or(existing.start_date);

    validate_fields(&name, price, &payment_method, start_date, now)?;

    let renewal_date = req
        .renewal_date
        .unwrap_or_else(|| derive_renewal_date(start_date, frequency));

    let mut status = req.status.unwrap_or(existing.status);
    if renewal_date < start_date {
        status = SubscriptionStatus::Expired;
    }

    Ok(SubscriptionChanges {
        name,
        price,
        currency,
        frequency,
        category,
        payment_method,
        status,
        start_date,
        renewal_date,
    })
}

fn validate_fields(
    name: &str,
    price: f64,
    payment_method: &str,
    start_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Res<()> {
    let name_len = name.chars().count();
    if name_len < 2 || name_len > 100 {
        return Err(AppError::Validation(
            "Subscription name must contain between 2 and 100 characters".to_string(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Subscription price must be a positive number".to_string(),
        ));
    }
    if payment_method.is_empty() {
        return Err(AppError::Validation(
            "Payment method is required".to_string(),
        ));
    }
    if start_date > now {
        return Err(AppError::Validation(
            "Start date must be in the past or present".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::subscription::{Category, Currency};

    fn base_request(start_date: DateTime<Utc>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            name: "Streaming Plus".to_string(),
            price: 9.99,
            currency: Currency::default(),
            frequency: Frequency::Monthly,
            category: Category::Entertainment,
            payment_method: "credit card".to_string(),
            status: None,
            start_date,
            renewal_date: None,
        }
    }

    #[test]
    fn renewal_date_derives_from_frequency() {
        let now = Utc::now();
        let start = now - Duration::days(1);
        let cases = [
            (Frequency::Daily, 1),
            (Frequency::Weekly, 7),
            (Frequency::Monthly, 30),
            (Frequency::Yearly, 365),
        ];
        for (frequency, days) in cases {
            let mut req = base_request(start);
            req.frequency = frequency;
            let resolved = resolve_new_subscription(Uuid::new_v4(), req, now).unwrap();
            assert_eq!(resolved.renewal_date, start + Duration::days(days));
            assert_eq!(resolved.status, SubscriptionStatus::Active);
        }
    }

    #[test]
    fn explicit_renewal_date_is_kept() {
        let now = Utc::now();
        let start = now - Duration::days(10);
        let renewal = now + Duration::days(20);
        let mut req = base_request(start);
        req.renewal_date = Some(renewal);

        let resolved = resolve_new_subscription(Uuid::new_v4(), req, now).unwrap();
        assert_eq!(resolved.renewal_date, renewal);
    }

    #[test]
    fn renewal_before_start_forces_expired_status() {
        let now = Utc::now();
        let start = now - Duration::days(1);
        let mut req = base_request(start);
        req.renewal_date = Some(start - Duration::days(3));

        let resolved = resolve_new_subscription(Uuid::new_v4(), req, now).unwrap();
        assert_eq!(resolved.status, SubscriptionStatus::Expired);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let now = Utc::now();
        let start = now - Duration::days(1);

        let mut short_name = base_request(start);
        short_name.name = "x".to_string();
        assert!(resolve_new_subscription(Uuid::new_v4(), short_name, now).is_err());

        let mut long_name = base_request(start);
        long_name.name = "x".repeat(101);
        assert!(resolve_new_subscription(Uuid::new_v4(), long_name, now).is_err());

        let mut negative_price = base_request(start);
        negative_price.price = -1.0;
        assert!(resolve_new_subscription(Uuid::new_v4(), negative_price, now).is_err());

        let mut future_start = base_request(now + Duration::days(1));
        future_start.renewal_date = Some(now + Duration::days(30));
        assert!(resolve_new_subscription(Uuid::new_v4(), future_start, now).is_err());
    }

    fn existing_subscription(start: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            name: "Streaming Plus".to_string(),
            price: 9.99,
            currency: Currency::default(),
            frequency: Frequency::Monthly,
            category: Category::Entertainment,
            payment_method: "credit card".to_string(),
            status: SubscriptionStatus::Active,
            start_date: start,
            renewal_date: start + Duration::days(30),
            user_id: Uuid::new_v4(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn update_rederives_renewal_when_frequency_changes() {
        let now = Utc::now();
        let start = now - Duration::days(2);
        let existing = existing_subscription(start);

        let req = UpdateSubscriptionRequest {
            frequency: Some(Frequency::Yearly),
            ..Default::default()
        };
        let changes = resolve_changes(&existing, req, now).unwrap();
        assert_eq!(changes.renewal_date, start + Duration::days(365));
    }

    #[test]
    fn update_keeps_explicit_renewal_date() {
        let now = Utc::now();
        let start = now - Duration::days(2);
        let existing = existing_subscription(start);
        let renewal = now + Duration::days(90);

        let req = UpdateSubscriptionRequest {
            renewal_date: Some(renewal),
            ..Default::default()
        };
        let changes = resolve_changes(&existing, req, now).unwrap();
        assert_eq!(changes.renewal_date, renewal);
        assert_eq!(changes.status, SubscriptionStatus::Active);
    }
}
