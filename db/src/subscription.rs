use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::{NewSubscription, SubscriptionChanges},
    models::subscription::{Subscription, SubscriptionStatus, SubscriptionWithOwner},
};

const SUBSCRIPTION_COLUMNS: &str = "id, name, price, currency, frequency, category, \
     payment_method, status, start_date, renewal_date, user_id, created_at, updated_at";

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: NewSubscription,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO subscriptions
            (name, price, currency, frequency, category, payment_method,
             status, start_date, renewal_date, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(data.name)
    .bind(data.price)
    .bind(data.currency)
    .bind(data.frequency)
    .bind(data.category)
    .bind(data.payment_method)
    .bind(data.status)
    .bind(data.start_date)
    .bind(data.renewal_date)
    .bind(data.user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn list_all_with_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<SubscriptionWithOwner>> {
    sqlx::query_as::<_, SubscriptionWithOwner>(
        r#"
        SELECT s.*, u.name AS owner_name, u.email AS owner_email
        FROM subscriptions s
        JOIN users u ON u.id = s.user_id
        ORDER BY s.created_at
        "#,
    )
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn list_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<Subscription>> {
    sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_with_owner_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<Option<SubscriptionWithOwner>> {
    sqlx::query_as::<_, SubscriptionWithOwner>(
        r#"
        SELECT s.*, u.name AS owner_name, u.email AS owner_email
        FROM subscriptions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
    changes: SubscriptionChanges,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE subscriptions
        SET name = $2, price = $3, currency = $4, frequency = $5, category = $6,
            payment_method = $7, status = $8, start_date = $9, renewal_date = $10,
            updated_at = now()
        WHERE id = $1
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.price)
    .bind(changes.currency)
    .bind(changes.frequency)
    .bind(changes.category)
    .bind(changes.payment_method)
    .bind(changes.status)
    .bind(changes.start_date)
    .bind(changes.renewal_date)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
    status: SubscriptionStatus,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE subscriptions
        SET status = $2, updated_at = now()
        WHERE id = $1
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Active subscriptions whose renewal date has not passed yet.
/// Unbounded and unscoped by owner.
pub async fn list_upcoming<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    now: DateTime<Utc>,
) -> Res<Vec<Subscription>> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        SELECT {SUBSCRIPTION_COLUMNS}
        FROM subscriptions
        WHERE status = 'active' AND renewal_date >= $1
        ORDER BY renewal_date
        "#
    ))
    .bind(now)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
