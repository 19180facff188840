use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use db::models::reminder::ReminderWorkflow;

/// Registers a new workflow instance for the subscription. The scheduler
/// picks it up on its next pass; callers do not wait for any of it.
pub async fn start_workflow(pool: &PgPool, subscription_id: Uuid) -> Res<ReminderWorkflow> {
    let workflow = db::reminder::insert_workflow(pool, subscription_id).await?;
    log::debug!(
        "Registered reminder workflow {} for subscription {}",
        workflow.id,
        subscription_id
    );
    Ok(workflow)
}
