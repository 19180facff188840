use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reminder_status", rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sleeping,
    Emitting,
    Done,
    Aborted,
}

/// One reminder-workflow instance. `step_index` is the resumable execution
/// pointer; `renewal_date` is captured once, at evaluation, and never
/// re-read from the subscription afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReminderWorkflow {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub status: ReminderStatus,
    pub step_index: i32,
    pub renewal_date: Option<DateTime<Utc>>,
    pub next_wake_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
