use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::error::Res;
use sqlx::PgPool;

use crate::runner;

/// Spawns the background task that resumes due workflows.
///
/// The wake times live in the database, so a restart loses nothing; the
/// first pass after boot picks up whatever became due in the meantime.
pub fn spawn(pool: Arc<PgPool>, poll_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(poll_seconds.max(1)));
        loop {
            interval.tick().await;
            if let Err(err) = run_due(&pool).await {
                log::error!("Reminder scheduler pass failed: {}", err);
            }
        }
    });
}

async fn run_due(pool: &PgPool) -> Res<()> {
    let now = Utc::now();
    let due = db::reminder::list_due(pool, now).await?;

    for workflow in due {
        if let Err(err) = runner::resume(pool, &workflow, now).await {
            // one broken instance must not starve the rest
            log::error!("Reminder workflow {} failed to resume: {}", workflow.id, err);
        }
    }
    Ok(())
}
