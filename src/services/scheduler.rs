//! Notification scheduler.
//!
//! Turns matched pairs into PENDING queue entries due at a time that depends
//! on the subscription's frequency. Digests go out at 09:00 local time.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::domain::notification::NewNotification;
use crate::domain::types::NotificationFrequency;
use crate::repository::NotificationWriter;

use super::ServiceResult;
use super::matcher::MatchedPair;

const DIGEST_HOUR: u32 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    pub enqueued: usize,
    /// Pairs already present in the queue.
    pub duplicates: usize,
}

/// Current time in the configured local offset. Out-of-range offsets fall back to UTC.
pub fn local_now(offset_hours: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(offset_hours.saturating_mul(3600))
        .unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

fn digest_time<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    date.and_hms_opt(DIGEST_HOUR, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
}

/// Instant at which a notification for `frequency` becomes due.
pub fn scheduled_for<Tz: TimeZone>(
    frequency: NotificationFrequency,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let candidate = match frequency {
        NotificationFrequency::Immediate => return now.clone(),
        NotificationFrequency::Daily => digest_time(today, &tz)
            .filter(|at| at > now)
            .or_else(|| digest_time(today + Days::new(1), &tz)),
        NotificationFrequency::Weekly => {
            let days_to_monday = (7 - today.weekday().num_days_from_monday()) % 7;
            let monday = today + Days::new(u64::from(days_to_monday));
            digest_time(monday, &tz)
                .filter(|at| at > now)
                .or_else(|| digest_time(monday + Days::new(7), &tz))
        }
    };

    candidate.unwrap_or_else(|| now.clone())
}

/// Enqueues one PENDING entry per pair. Re-scheduling a pair is a no-op.
pub fn schedule_matches<R>(
    repo: &R,
    pairs: &[MatchedPair],
    now: DateTime<FixedOffset>,
) -> ServiceResult<ScheduleReport>
where
    R: NotificationWriter,
{
    let mut report = ScheduleReport::default();
    for pair in pairs {
        let due = scheduled_for(pair.frequency, &now);
        let entry = NewNotification {
            user_id: pair.user_id,
            subscription_id: pair.subscription_id,
            job_id: pair.job_id,
            scheduled_for: due.naive_utc(),
        };
        if repo.enqueue_notification(&entry)? {
            report.enqueued += 1;
        } else {
            report.duplicates += 1;
        }
    }
    log::info!(
        "Scheduled {} notifications ({} already queued)",
        report.enqueued,
        report.duplicates
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, Weekday};

    use super::*;
    use crate::domain::types::{JobId, NotificationStatus, SubscriptionId, UserId};
    use crate::repository::test::TestRepository;

    fn local(s: &str) -> DateTime<FixedOffset> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .from_local_datetime(&naive)
            .unwrap()
    }

    fn fmt(at: DateTime<FixedOffset>) -> String {
        at.format("%Y-%m-%d %H:%M").to_string()
    }

    #[test]
    fn daily_rolls_over_after_nine() {
        // 2024-03-05 is a Tuesday.
        let afternoon = local("2024-03-05 14:00");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Daily, &afternoon)),
            "2024-03-06 09:00"
        );

        let morning = local("2024-03-05 08:00");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Daily, &morning)),
            "2024-03-05 09:00"
        );

        let exactly = local("2024-03-05 09:00");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Daily, &exactly)),
            "2024-03-06 09:00"
        );
    }

    #[test]
    fn weekly_always_lands_on_a_future_monday() {
        for day in 4..=10 {
            let now = local(&format!("2024-03-{day:02} 12:00"));
            let at = scheduled_for(NotificationFrequency::Weekly, &now);
            assert_eq!(at.weekday(), Weekday::Mon);
            assert!(at > now);
            assert!(at - now <= chrono::Duration::days(7));
        }

        let tuesday = local("2024-03-05 14:00");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Weekly, &tuesday)),
            "2024-03-11 09:00"
        );

        let monday_early = local("2024-03-04 07:30");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Weekly, &monday_early)),
            "2024-03-04 09:00"
        );

        let monday_nine = local("2024-03-04 09:00");
        assert_eq!(
            fmt(scheduled_for(NotificationFrequency::Weekly, &monday_nine)),
            "2024-03-11 09:00"
        );
    }

    #[test]
    fn immediate_is_now() {
        let now = local("2024-03-05 14:37");
        assert_eq!(scheduled_for(NotificationFrequency::Immediate, &now), now);
    }

    #[test]
    fn stores_due_time_in_utc_and_skips_duplicates() {
        let repo = TestRepository::new();
        let pair = MatchedPair {
            subscription_id: SubscriptionId::new(1).unwrap(),
            user_id: UserId::new(1).unwrap(),
            frequency: NotificationFrequency::Daily,
            job_id: JobId::new(7).unwrap(),
        };
        let now = local("2024-03-05 14:00");

        let first = schedule_matches(&repo, &[pair], now).unwrap();
        let second = schedule_matches(&repo, &[pair, pair], now).unwrap();

        assert_eq!(first, ScheduleReport { enqueued: 1, duplicates: 0 });
        assert_eq!(second, ScheduleReport { enqueued: 0, duplicates: 2 });

        let queued = repo.notifications();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].status, NotificationStatus::Pending);
        assert_eq!(
            queued[0].scheduled_for.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-06 06:00"
        );
    }
}
