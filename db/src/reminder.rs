use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::reminder::{ReminderStatus, ReminderWorkflow};

const WORKFLOW_COLUMNS: &str = "id, subscription_id, status, step_index, renewal_date, \
     next_wake_at, created_at, updated_at";

pub async fn insert_workflow<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
) -> Res<ReminderWorkflow> {
    sqlx::query_as::<_, ReminderWorkflow>(&format!(
        r#"
        INSERT INTO reminder_workflows (subscription_id)
        VALUES ($1)
        RETURNING {WORKFLOW_COLUMNS}
        "#
    ))
    .bind(subscription_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Workflows ready to run: never-started instances plus sleepers whose
/// wake time has arrived.
pub async fn list_due<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    now: DateTime<Utc>,
) -> Res<Vec<ReminderWorkflow>> {
    sqlx::query_as::<_, ReminderWorkflow>(&format!(
        r#"
        SELECT {WORKFLOW_COLUMNS}
        FROM reminder_workflows
        WHERE status = 'pending'
           OR (status IN ('sleeping', 'emitting') AND (next_wake_at IS NULL OR next_wake_at <= $1))
        ORDER BY created_at
        "#
    ))
    .bind(now)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

/// Persists a step transition. The pointer and the step's outcome move in
/// one statement, which is what makes completed steps safe to not replay.
pub async fn save_progress<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
    status: ReminderStatus,
    step_index: i32,
    renewal_date: Option<DateTime<Utc>>,
    next_wake_at: Option<DateTime<Utc>>,
) -> Res<()> {
    sqlx::query(
        r#"
        UPDATE reminder_workflows
        SET status = $2, step_index = $3, renewal_date = $4, next_wake_at = $5,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(step_index)
    .bind(renewal_date)
    .bind(next_wake_at)
    .execute(executor)
    .await?;
    Ok(())
}
