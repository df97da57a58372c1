//! Retention cleaner.

use chrono::{Days, NaiveDateTime};

use crate::repository::{PurgeCounts, RetentionWriter};

use super::{ServiceError, ServiceResult};

/// Deletes postings published, and crawl logs written, more than
/// `retention_days` before `now`.
///
/// Dependent rows are removed by the storage cascade. The purge either
/// succeeds as a whole or reports failure without counts.
pub fn purge_expired<R: RetentionWriter>(
    repo: &R,
    now: NaiveDateTime,
    retention_days: u64,
) -> ServiceResult<PurgeCounts> {
    let cutoff = now
        .checked_sub_days(Days::new(retention_days))
        .ok_or_else(|| ServiceError::Form(format!("invalid retention of {retention_days} days")))?;

    match repo.purge_older_than(cutoff) {
        Ok(counts) => {
            log::info!(
                "Retention purge before {cutoff}: {} jobs, {} crawl logs",
                counts.jobs,
                counts.crawl_logs
            );
            Ok(counts)
        }
        Err(e) => {
            log::error!("Retention purge failed: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::crawl_log::CrawlLog;
    use crate::domain::types::{CrawlLogId, CrawlStatus, CrawlTrigger, JobSource};
    use crate::repository::test::TestRepository;
    use crate::services::matcher::tests::job;

    fn log_at(id: i32, created_at: NaiveDateTime) -> CrawlLog {
        CrawlLog {
            id: CrawlLogId::new(id).unwrap(),
            source: JobSource::Remotive,
            status: CrawlStatus::Success,
            trigger: CrawlTrigger::Scheduled,
            actor: None,
            total_count: 1,
            success_count: 1,
            fail_count: 0,
            duration_ms: 10,
            error_message: None,
            created_at,
        }
    }

    #[test]
    fn keeps_89_day_old_rows_and_drops_91_day_old_ones() {
        let now = Utc::now().naive_utc();
        let mut old = job(1);
        old.published_at = now - Duration::days(91);
        let mut recent = job(2);
        recent.published_at = now - Duration::days(89);

        let repo = TestRepository::new()
            .with_job(old)
            .with_job(recent)
            .with_crawl_log(log_at(1, now - Duration::days(91)))
            .with_crawl_log(log_at(2, now - Duration::days(89)));

        let counts = purge_expired(&repo, now, 90).unwrap();
        assert_eq!(counts, PurgeCounts { jobs: 1, crawl_logs: 1 });

        let remaining: Vec<i32> = repo.jobs().iter().map(|j| j.id.get()).collect();
        assert_eq!(remaining, vec![2]);
        assert_eq!(repo.crawl_logs()[0].id.get(), 2);
    }
}
