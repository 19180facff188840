use chrono::{DateTime, Utc};

use db::models::reminder::{ReminderStatus, ReminderWorkflow};
use db::models::subscription::SubscriptionStatus;

use crate::plan::{REMINDER_LEAD_DAYS, reminder_target};

/// What the runner should do next. Every variant except `Emit` ends the
/// current resume pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The subscription has not been loaded yet.
    NeedsFetch,
    /// Suspend until the wake time; a later poll resumes from here.
    Sleep(DateTime<Utc>),
    /// Fire the reminder for this lead time, then continue.
    Emit(i64),
    Done,
    Aborted,
}

/// In-memory image of one workflow row.
///
/// `step_index` points into `REMINDER_LEAD_DAYS` twice over: while sleeping
/// it is the lead currently being awaited, while emitting it is the next
/// lead to fire. The runner persists the state after every transition, which
/// is what makes the instance crash-resumable without replaying side
/// effects.
#[derive(Debug, Clone)]
pub struct ReminderMachine {
    pub status: ReminderStatus,
    pub step_index: i32,
    pub renewal_date: Option<DateTime<Utc>>,
    pub next_wake_at: Option<DateTime<Utc>>,
}

impl From<&ReminderWorkflow> for ReminderMachine {
    fn from(row: &ReminderWorkflow) -> Self {
        ReminderMachine {
            status: row.status,
            step_index: row.step_index,
            renewal_date: row.renewal_date,
            next_wake_at: row.next_wake_at,
        }
    }
}

impl ReminderMachine {
    /// Evaluation step: decides whether the instance runs at all.
    ///
    /// A missing record, a non-active status or an already-passed renewal
    /// date aborts. Otherwise the renewal date is captured into the
    /// workflow; the subscription is never consulted again.
    pub fn on_loaded(
        &mut self,
        subscription: Option<(SubscriptionStatus, DateTime<Utc>)>,
        now: DateTime<Utc>,
    ) {
        match subscription {
            Some((SubscriptionStatus::Active, renewal_date)) if renewal_date >= now => {
                self.renewal_date = Some(renewal_date);
                self.status = ReminderStatus::Sleeping;
                self.step_index = 0;
                self.next_wake_at = None;
            }
            _ => {
                self.status = ReminderStatus::Aborted;
                self.next_wake_at = None;
            }
        }
    }

    /// Advances to the next runnable step at time `now`.
    ///
    /// Scheduling walks the lead times in order and suspends on each one
    /// whose target is still ahead; targets already behind are skipped.
    /// Once no suspensions remain, every lead time emits, the skipped ones
    /// included, exactly as the source behavior this preserves.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        loop {
            match self.status {
                ReminderStatus::Pending => return Tick::NeedsFetch,
                ReminderStatus::Aborted => return Tick::Aborted,
                ReminderStatus::Done => return Tick::Done,
                ReminderStatus::Sleeping => {
                    let Some(renewal_date) = self.renewal_date else {
                        self.status = ReminderStatus::Aborted;
                        return Tick::Aborted;
                    };

                    let mut index = self.step_index.max(0) as usize;
                    while index < REMINDER_LEAD_DAYS.len() {
                        let wake_at = reminder_target(renewal_date, REMINDER_LEAD_DAYS[index]);
                        if wake_at > now {
                            self.step_index = index as i32;
                            self.next_wake_at = Some(wake_at);
                            return Tick::Sleep(wake_at);
                        }
                        index += 1;
                    }

                    // all suspensions behind us; start the emission pass
                    self.status = ReminderStatus::Emitting;
                    self.step_index = 0;
                    self.next_wake_at = None;
                }
                ReminderStatus::Emitting => {
                    let index = self.step_index.max(0) as usize;
                    if index < REMINDER_LEAD_DAYS.len() {
                        return Tick::Emit(REMINDER_LEAD_DAYS[index]);
                    }
                    self.status = ReminderStatus::Done;
                    return Tick::Done;
                }
            }
        }
    }

    /// Records one fired reminder; the pointer moves so a restart does not
    /// fire it again.
    pub fn emitted(&mut self) {
        self.step_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh_machine() -> ReminderMachine {
        ReminderMachine {
            status: ReminderStatus::Pending,
            step_index: 0,
            renewal_date: None,
            next_wake_at: None,
        }
    }

    /// Drives a machine the way the runner would, collecting sleeps and
    /// emissions. Each sleep fast-forwards the clock to the wake time.
    fn drive(machine: &mut ReminderMachine, mut now: DateTime<Utc>) -> (Vec<DateTime<Utc>>, Vec<i64>) {
        let mut sleeps = Vec::new();
        let mut emissions = Vec::new();
        loop {
            match machine.tick(now) {
                Tick::NeedsFetch => panic!("machine not evaluated yet"),
                Tick::Sleep(wake_at) => {
                    sleeps.push(wake_at);
                    now = wake_at;
                }
                Tick::Emit(lead) => {
                    emissions.push(lead);
                    machine.emitted();
                }
                Tick::Done | Tick::Aborted => return (sleeps, emissions),
            }
        }
    }

    #[test]
    fn renewal_ten_days_out_sleeps_four_times_then_emits_all() {
        let now = Utc::now();
        let renewal = now + Duration::days(10);

        let mut machine = fresh_machine();
        machine.on_loaded(Some((SubscriptionStatus::Active, renewal)), now);
        let (sleeps, emissions) = drive(&mut machine, now);

        assert_eq!(
            sleeps,
            vec![
                renewal - Duration::days(7), // now + 3d
                renewal - Duration::days(5), // now + 5d
                renewal - Duration::days(2), // now + 8d
                renewal - Duration::days(1), // now + 9d
            ]
        );
        assert_eq!(emissions, vec![7, 5, 2, 1]);
        assert_eq!(machine.status, ReminderStatus::Done);
    }

    #[test]
    fn renewal_half_day_out_skips_every_sleep_but_still_emits_all() {
        let now = Utc::now();
        let renewal = now + Duration::hours(12);

        let mut machine = fresh_machine();
        machine.on_loaded(Some((SubscriptionStatus::Active, renewal)), now);
        let (sleeps, emissions) = drive(&mut machine, now);

        assert!(sleeps.is_empty());
        assert_eq!(emissions, vec![7, 5, 2, 1]);
        assert_eq!(machine.status, ReminderStatus::Done);
    }

    #[test]
    fn mid_window_renewal_skips_only_the_passed_leads() {
        let now = Utc::now();
        // 7-day and 5-day targets are behind, 2-day and 1-day ahead
        let renewal = now + Duration::days(3);

        let mut machine = fresh_machine();
        machine.on_loaded(Some((SubscriptionStatus::Active, renewal)), now);
        let (sleeps, emissions) = drive(&mut machine, now);

        assert_eq!(
            sleeps,
            vec![renewal - Duration::days(2), renewal - Duration::days(1)]
        );
        assert_eq!(emissions, vec![7, 5, 2, 1]);
    }

    #[test]
    fn missing_subscription_aborts() {
        let now = Utc::now();
        let mut machine = fresh_machine();
        machine.on_loaded(None, now);
        assert_eq!(machine.tick(now), Tick::Aborted);
    }

    #[test]
    fn non_active_subscription_aborts() {
        let now = Utc::now();
        let renewal = now + Duration::days(10);
        for status in [SubscriptionStatus::Cancelled, SubscriptionStatus::Expired] {
            let mut machine = fresh_machine();
            machine.on_loaded(Some((status, renewal)), now);
            assert_eq!(machine.tick(now), Tick::Aborted);
        }
    }

    #[test]
    fn passed_renewal_date_aborts() {
        let now = Utc::now();
        let mut machine = fresh_machine();
        machine.on_loaded(
            Some((SubscriptionStatus::Active, now - Duration::hours(1))),
            now,
        );
        assert_eq!(machine.tick(now), Tick::Aborted);
    }

    #[test]
    fn resume_mid_sleep_continues_at_the_pointer() {
        let now = Utc::now();
        let renewal = now + Duration::days(10);

        // as persisted after the second suspension was scheduled
        let mut machine = ReminderMachine {
            status: ReminderStatus::Sleeping,
            step_index: 1,
            renewal_date: Some(renewal),
            next_wake_at: Some(renewal - Duration::days(5)),
        };

        // woken at the 5-day target: next sleep is the 2-day target
        let woke_at = renewal - Duration::days(5);
        assert_eq!(
            machine.tick(woke_at),
            Tick::Sleep(renewal - Duration::days(2))
        );
    }

    #[test]
    fn resume_mid_emission_does_not_refire_completed_steps() {
        let now = Utc::now();
        let renewal = now + Duration::hours(6);

        // two reminders already fired before the crash
        let mut machine = ReminderMachine {
            status: ReminderStatus::Emitting,
            step_index: 2,
            renewal_date: Some(renewal),
            next_wake_at: None,
        };

        let (_, emissions) = drive(&mut machine, now);
        assert_eq!(emissions, vec![2, 1]);
        assert_eq!(machine.status, ReminderStatus::Done);
    }
}
