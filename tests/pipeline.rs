use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use jobfeed::adapters::{AdapterError, AdapterRegistry, FetchBatch, RawJob, SourceAdapter};
use jobfeed::domain::subscription::{NewSubscription, SubscriptionFilters};
use jobfeed::domain::types::{
    CrawlStatus, EmploymentType, JobSource, NotificationFrequency, RemoteType, SubscriptionName,
};
use jobfeed::mailer::{DigestRenderer, MailError, Mailer, OutgoingEmail};
use jobfeed::repository::{
    CrawlLogListQuery, CrawlLogReader, DieselRepository, JobReader, SubscriptionWriter,
};
use jobfeed::services::delivery::{DeliverySettings, deliver_due_notifications};
use jobfeed::services::ingestion::IngestionOptions;
use jobfeed::services::pipeline::crawl_and_schedule;

mod common;

struct FixedAdapter {
    jobs: Vec<RawJob>,
}

#[async_trait]
impl SourceAdapter for FixedAdapter {
    fn source(&self) -> JobSource {
        JobSource::RemoteOk
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        Ok(FetchBatch {
            jobs: self.jobs.clone(),
            ..FetchBatch::default()
        })
    }
}

struct UnreachableAdapter;

#[async_trait]
impl SourceAdapter for UnreachableAdapter {
    fn source(&self) -> JobSource {
        JobSource::Himalayas
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        Err(AdapterError::Status {
            status: 503,
            url: "https://himalayas.app/jobs/api".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[tokio::test]
async fn senior_react_posting_flows_from_crawl_to_digest() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let user_id = test_db.insert_user("dev@example.com", false, true);
    repo.create_subscription(&NewSubscription {
        user_id,
        name: SubscriptionName::new("Full-time roles").unwrap(),
        is_active: true,
        frequency: NotificationFrequency::Daily,
        filters: SubscriptionFilters {
            job_types: vec![EmploymentType::FullTime],
            ..SubscriptionFilters::default()
        },
        tags: vec![],
    })
    .unwrap();

    let posting = RawJob::new(
        "Senior React Developer",
        "Acme",
        "We are a remote-first team building with React and TypeScript.",
        "https://remoteok.com/remote-jobs/4242",
        Utc::now().naive_utc(),
    );
    let registry = AdapterRegistry::new(vec![
        Box::new(UnreachableAdapter),
        Box::new(FixedAdapter { jobs: vec![posting] }),
    ]);

    let offset = FixedOffset::east_opt(0).unwrap();
    let local = NaiveDateTime::parse_from_str("2024-03-05 14:00", "%Y-%m-%d %H:%M").unwrap();
    let now = offset.from_local_datetime(&local).unwrap();
    let options = IngestionOptions::scheduled(30, Duration::ZERO);

    let report = crawl_and_schedule(&repo, &registry, None, &options, now)
        .await
        .unwrap();

    assert_eq!(report.ingestion.sources.len(), 2);
    assert_eq!(report.ingestion.sources[0].status, CrawlStatus::Failed);
    assert_eq!(report.ingestion.sources[1].status, CrawlStatus::Success);
    assert_eq!(report.matched, 1);
    assert_eq!(report.scheduled.enqueued, 1);

    let job_id = report.ingestion.new_job_ids[0];
    let job = repo.get_job_by_id(job_id).unwrap().unwrap();
    assert_eq!(job.employment_type, EmploymentType::FullTime);
    assert_eq!(job.remote_type, RemoteType::FullyRemote);
    assert_eq!(job.category_id.map(|c| c.get()), Some(6));

    let (total, logs) = repo.list_crawl_logs(CrawlLogListQuery::default()).unwrap();
    assert_eq!(total, 2);
    let failed = logs
        .iter()
        .find(|log| log.source == JobSource::Himalayas)
        .unwrap();
    assert_eq!(failed.total_count, 0);
    assert!(failed.error_message.as_deref().unwrap().contains("503"));

    // Nothing is due before Wednesday 09:00.
    let mailer = RecordingMailer::default();
    let renderer = DigestRenderer::new("https://jobs.example.com").unwrap();
    let settings = DeliverySettings {
        batch_limit: 100,
        group_delay: Duration::ZERO,
    };
    let early = NaiveDateTime::parse_from_str("2024-03-06 08:59", "%Y-%m-%d %H:%M").unwrap();
    let delivered = deliver_due_notifications(&repo, &mailer, &renderer, &settings, early)
        .await
        .unwrap();
    assert_eq!(delivered.sent, 0);

    let due = NaiveDateTime::parse_from_str("2024-03-06 09:00", "%Y-%m-%d %H:%M").unwrap();
    let delivered = deliver_due_notifications(&repo, &mailer, &renderer, &settings, due)
        .await
        .unwrap();
    assert_eq!(delivered.sent, 1);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "1 new jobs for \"Full-time roles\"");
    assert!(sent[0].html_body.contains("Senior React Developer"));
}
