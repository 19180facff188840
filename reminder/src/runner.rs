use chrono::{DateTime, Utc};
use common::error::Res;
use sqlx::PgPool;

use db::models::reminder::ReminderWorkflow;

use crate::machine::{ReminderMachine, Tick};

/// Runs one workflow instance as far as it can go at `now`.
///
/// Each fetch, suspension and emission is persisted individually before the
/// pass continues, so a crash between steps resumes at the pointer instead
/// of replaying completed work.
pub async fn resume(pool: &PgPool, workflow: &ReminderWorkflow, now: DateTime<Utc>) -> Res<()> {
    let mut machine = ReminderMachine::from(workflow);

    loop {
        match machine.tick(now) {
            Tick::NeedsFetch => {
                let loaded =
                    match db::subscription::get_with_owner_by_id(pool, workflow.subscription_id)
                        .await
                    {
                        Ok(found) => found,
                        Err(err) => {
                            // fire-and-forget: nothing upstream to answer to
                            log::error!(
                                "Error fetching subscription {} for reminder workflow {}: {}",
                                workflow.subscription_id,
                                workflow.id,
                                err
                            );
                            None
                        }
                    };

                if let Some(record) = &loaded {
                    log::debug!(
                        "Reminder workflow {} evaluating subscription {} ({})",
                        workflow.id,
                        record.subscription.name,
                        record.owner_email
                    );
                }

                machine.on_loaded(
                    loaded
                        .as_ref()
                        .map(|s| (s.subscription.status, s.subscription.renewal_date)),
                    now,
                );
                save(pool, workflow, &machine).await?;

                if machine.status == db::models::reminder::ReminderStatus::Aborted {
                    log::info!(
                        "No active subscription with an upcoming renewal for workflow {}. Skipping reminders.",
                        workflow.id
                    );
                }
            }
            Tick::Sleep(wake_at) => {
                log::info!(
                    "Scheduling reminder for workflow {} at {}",
                    workflow.id,
                    wake_at.format("%Y-%m-%d %H:%M:%S")
                );
                save(pool, workflow, &machine).await?;
                return Ok(());
            }
            Tick::Emit(lead_days) => {
                log::info!("Triggering reminder: Reminder {} days before renewal", lead_days);
                machine.emitted();
                save(pool, workflow, &machine).await?;
            }
            Tick::Done | Tick::Aborted => {
                save(pool, workflow, &machine).await?;
                return Ok(());
            }
        }
    }
}

async fn save(pool: &PgPool, workflow: &ReminderWorkflow, machine: &ReminderMachine) -> Res<()> {
    db::reminder::save_progress(
        pool,
        workflow.id,
        machine.status,
        machine.step_index,
        machine.renewal_date,
        machine.next_wake_at,
    )
    .await
}
