use actix_web::{Responder, post, web};
use common::error::Res;
use common::http::Success;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::service;

#[derive(Debug, Deserialize)]
pub struct ReminderTriggerRequest {
    pub subscription_id: Uuid,
}

/// External trigger surface: hands a subscription id to the reminder
/// workflow. The caller gets an acknowledgment, not a result; evaluation
/// and emission happen out-of-band.
#[post("/subscription/reminder")]
pub async fn post_subscription_reminder(
    req: web::Json<ReminderTriggerRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let workflow = service::start_workflow(&pool, req.subscription_id).await?;
    Success::ok(serde_json::json!({
        "message": "Reminder workflow registered",
        "workflow_id": workflow.id,
    }))
}
