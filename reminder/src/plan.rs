use chrono::{DateTime, Duration, Utc};

/// Days before renewal at which a reminder fires, in emission order.
pub const REMINDER_LEAD_DAYS: [i64; 4] = [7, 5, 2, 1];

/// The moment the reminder for a given lead time targets.
pub fn reminder_target(renewal_date: DateTime<Utc>, lead_days: i64) -> DateTime<Utc> {
    renewal_date - Duration::days(lead_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_ordered_ascending_for_descending_leads() {
        let renewal = Utc::now() + Duration::days(10);
        let targets: Vec<_> = REMINDER_LEAD_DAYS
            .iter()
            .map(|&lead| reminder_target(renewal, lead))
            .collect();
        assert!(targets.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(targets[0], renewal - Duration::days(7));
        assert_eq!(targets[3], renewal - Duration::days(1));
    }
}
