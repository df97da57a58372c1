//! Crawl followed by matching and scheduling of the new postings.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::adapters::AdapterRegistry;
use crate::domain::types::JobSource;
use crate::repository::{
    CrawlLogWriter, JobReader, JobWriter, NotificationWriter, SubscriptionReader, TaxonomyReader,
};

use super::ServiceResult;
use super::ingestion::{self, IngestionOptions, IngestionReport};
use super::matcher::match_new_jobs;
use super::scheduler::{ScheduleReport, schedule_matches};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    #[serde(flatten)]
    pub ingestion: IngestionReport,
    pub matched: usize,
    pub scheduled: ScheduleReport,
}

/// Crawls one source, or every source when `source` is `None`, then queues
/// notifications for the postings that run inserted.
pub async fn crawl_and_schedule<R>(
    repo: &R,
    registry: &AdapterRegistry,
    source: Option<JobSource>,
    options: &IngestionOptions,
    now: DateTime<FixedOffset>,
) -> ServiceResult<PipelineReport>
where
    R: JobReader
        + JobWriter
        + CrawlLogWriter
        + TaxonomyReader
        + SubscriptionReader
        + NotificationWriter,
{
    let report = match source {
        Some(source) => ingestion::run_source(repo, registry, source, options).await?,
        None => ingestion::run_all(repo, registry, options).await?,
    };
    let pairs = match_new_jobs(repo, &report.new_job_ids)?;
    let scheduled = schedule_matches(repo, &pairs, now)?;

    Ok(PipelineReport {
        ingestion: report,
        matched: pairs.len(),
        scheduled,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone};

    use super::*;
    use crate::adapters::RawJob;
    use crate::domain::types::{
        CategoryId, EmailAddress, EmploymentType, NotificationStatus, RemoteType, UserId,
    };
    use crate::domain::user::Recipient;
    use crate::repository::test::{TestRepository, TestUser};
    use crate::services::ingestion::tests::{StaticAdapter, raw, seeded_categories};
    use crate::services::matcher::tests::subscription;

    #[tokio::test]
    async fn new_react_posting_reaches_a_daily_subscriber() {
        let mut sub = subscription(1, 1);
        sub.filters.job_types = vec![EmploymentType::FullTime];
        let repo = TestRepository::new()
            .with_categories(seeded_categories())
            .with_user(TestUser {
                recipient: Recipient {
                    user_id: UserId::new(1).unwrap(),
                    email: EmailAddress::new("dev@example.com").unwrap(),
                    name: None,
                },
                is_banned: false,
                email_notifications: true,
            })
            .with_subscription(sub);

        let posting: RawJob = raw("Senior React Developer", "https://remoteok.com/remote-jobs/42");
        let registry = AdapterRegistry::new(vec![Box::new(StaticAdapter::jobs(
            JobSource::RemoteOk,
            vec![posting],
        ))]);

        let offset = FixedOffset::east_opt(0).unwrap();
        let naive = NaiveDateTime::parse_from_str("2024-03-05 14:00", "%Y-%m-%d %H:%M").unwrap();
        let now = offset.from_local_datetime(&naive).unwrap();
        let options = IngestionOptions::scheduled(30, std::time::Duration::ZERO);

        let report = crawl_and_schedule(&repo, &registry, None, &options, now)
            .await
            .unwrap();
        assert_eq!(report.ingestion.new_job_ids.len(), 1);
        assert_eq!(report.matched, 1);
        assert_eq!(report.scheduled.enqueued, 1);

        let job = &repo.jobs()[0];
        assert_eq!(job.employment_type, EmploymentType::FullTime);
        assert_eq!(job.remote_type, RemoteType::FullyRemote);
        assert_eq!(job.category_id, Some(CategoryId::new(6).unwrap()));

        let queued = repo.notifications();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].status, NotificationStatus::Pending);
        assert_eq!(
            queued[0].scheduled_for.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-06 09:00"
        );

        // A second crawl finds nothing new and queues nothing.
        let again = crawl_and_schedule(&repo, &registry, None, &options, now)
            .await
            .unwrap();
        assert!(again.ingestion.new_job_ids.is_empty());
        assert_eq!(repo.notifications().len(), 1);
    }
}
