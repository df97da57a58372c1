//! Source adapters.
//!
//! Every external job board is wrapped in a [`SourceAdapter`]. Transport lives
//! in `fetch_recent`; the response body is turned into [`RawJob`] values by a
//! pure `parse_*` function per source so parsing can be tested offline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::types::{EmploymentType, ExperienceLevel, JobSource, RemoteType};
use crate::models::config::IngestionConfig;

pub mod arbeitnow;
pub mod hacker_news;
pub mod himalayas;
pub mod http;
pub mod jobicy;
pub mod normalize;
pub mod remoteok;
pub mod remotive;
pub mod rss_feed;
pub mod the_muse;
pub mod v2ex;
pub mod working_nomads;

use http::HttpFetcher;

/// Errors raised while talking to an external source.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("malformed feed: {0}")]
    Feed(#[from] rss::Error),
}

/// A posting as read from a source, before normalization into a
/// [`crate::domain::job::NewJobPosting`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawJob {
    pub title: String,
    pub company_name: String,
    /// Plain text, already stripped of markup.
    pub description: String,
    pub source_url: String,
    pub published_at: NaiveDateTime,
    pub employment_type: Option<EmploymentType>,
    pub remote_type: Option<RemoteType>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub requirements: Option<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub apply_url: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    /// Tags published by the source; mapped onto the skill vocabulary later.
    pub tags: Vec<String>,
}

impl RawJob {
    /// Builds a posting with only the mandatory fields set.
    pub fn new(
        title: impl Into<String>,
        company_name: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
        published_at: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            company_name: company_name.into(),
            description: description.into(),
            source_url: source_url.into(),
            published_at,
            employment_type: None,
            remote_type: None,
            experience_level: None,
            location: None,
            requirements: None,
            company_logo: None,
            company_website: None,
            apply_url: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            tags: Vec::new(),
        }
    }
}

/// An item the source returned but that could not be read as a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedItem {
    pub reference: String,
    pub reason: String,
}

impl MalformedItem {
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

/// Everything one adapter run produced.
#[derive(Debug, Default)]
pub struct FetchBatch {
    pub jobs: Vec<RawJob>,
    pub malformed: Vec<MalformedItem>,
    /// Pages that failed after an earlier page succeeded.
    pub page_errors: Vec<String>,
}

impl FetchBatch {
    /// Appends the outcome of another page.
    pub fn extend(&mut self, other: FetchBatch) {
        self.jobs.extend(other.jobs);
        self.malformed.extend(other.malformed);
        self.page_errors.extend(other.page_errors);
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.malformed.is_empty()
    }

    /// Records one parsed item, dropping postings outside the recency window.
    pub fn record(
        &mut self,
        item: Result<RawJob, MalformedItem>,
        settings: &AdapterSettings,
        now: NaiveDateTime,
    ) {
        match item {
            Ok(job) if settings.is_recent(job.published_at, now) => self.jobs.push(job),
            Ok(_) => {}
            Err(malformed) => self.malformed.push(malformed),
        }
    }
}

/// One page of a paginated source.
#[derive(Debug, Default)]
pub struct Page {
    pub batch: FetchBatch,
    pub has_more: bool,
}

/// Shared knobs handed to every adapter.
#[derive(Debug, Clone, Copy)]
pub struct AdapterSettings {
    pub recency_days: i64,
    pub max_pages: u32,
}

impl AdapterSettings {
    /// Whether a publication timestamp falls inside the recency window.
    pub fn is_recent(&self, published_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        normalize::is_recent(published_at, now, self.recency_days)
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            recency_days: 30,
            max_pages: 3,
        }
    }
}

impl From<&IngestionConfig> for AdapterSettings {
    fn from(config: &IngestionConfig) -> Self {
        Self {
            recency_days: config.recency_days,
            max_pages: config.max_pages.max(1),
        }
    }
}

/// A pluggable external job source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> JobSource;

    /// Fetch the source's recent postings.
    ///
    /// Returns `Err` only when nothing could be read at all.
    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError>;
}

/// Decodes one element of a JSON array so a bad item does not sink its page.
pub(crate) fn decode_item<T: DeserializeOwned>(
    value: serde_json::Value,
    reference: &str,
) -> Result<T, MalformedItem> {
    serde_json::from_value(value).map_err(|e| MalformedItem::new(reference, e.to_string()))
}

/// Fetches pages `0..max_pages` until one reports no more results or
/// contributes no recent postings.
///
/// A failure of the first page fails the whole source; later failures are
/// logged, recorded on the batch and end the crawl with partial results.
pub(crate) async fn collect_pages<F, Fut>(
    source: JobSource,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<FetchBatch, AdapterError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page, AdapterError>>,
{
    let mut batch = FetchBatch::default();
    for page in 0..max_pages.max(1) {
        match fetch_page(page).await {
            Ok(result) => {
                let accepted = result.batch.jobs.len();
                let has_more = result.has_more;
                batch.extend(result.batch);
                if !has_more || accepted == 0 {
                    break;
                }
            }
            Err(e) if page == 0 => return Err(e),
            Err(e) => {
                log::warn!("{source}: page {page} failed: {e}");
                batch.page_errors.push(format!("page {page}: {e}"));
                break;
            }
        }
    }
    Ok(batch)
}

/// Combines the outcomes of several feeds of one source.
///
/// Failed feeds are recorded as page errors; the first error is returned
/// only when every feed failed.
pub(crate) fn merge_feeds<'a, I>(
    source: JobSource,
    results: I,
) -> Result<FetchBatch, AdapterError>
where
    I: IntoIterator<Item = (&'a str, Result<FetchBatch, AdapterError>)>,
{
    let mut batch = FetchBatch::default();
    let mut first_error = None;
    let mut any_ok = false;
    for (url, result) in results {
        match result {
            Ok(feed) => {
                any_ok = true;
                batch.extend(feed);
            }
            Err(e) => {
                log::warn!("{source}: feed {url} failed: {e}");
                batch.page_errors.push(format!("{url}: {e}"));
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) if !any_ok => Err(e),
        _ => Ok(batch),
    }
}

/// Reference time for recency checks.
pub(crate) fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// The set of adapters a deployment crawls, in crawl order.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Every built-in source sharing one HTTP client.
    pub fn with_default_sources(config: &IngestionConfig) -> Result<Self, AdapterError> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
        let settings = AdapterSettings::from(config);
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(remoteok::RemoteOkAdapter::new(fetcher.clone(), settings)),
            Box::new(remotive::RemotiveAdapter::new(fetcher.clone(), settings)),
            Box::new(arbeitnow::ArbeitnowAdapter::new(fetcher.clone(), settings)),
            Box::new(jobicy::JobicyAdapter::new(fetcher.clone(), settings)),
            Box::new(himalayas::HimalayasAdapter::new(fetcher.clone(), settings)),
            Box::new(working_nomads::WorkingNomadsAdapter::new(
                fetcher.clone(),
                settings,
            )),
            Box::new(the_muse::TheMuseAdapter::new(fetcher.clone(), settings)),
            Box::new(rss_feed::RssFeedAdapter::we_work_remotely(
                fetcher.clone(),
                settings,
            )),
            Box::new(rss_feed::RssFeedAdapter::jobspresso(fetcher.clone(), settings)),
            Box::new(rss_feed::RssFeedAdapter::real_work_from_anywhere(
                fetcher.clone(),
                settings,
            )),
            Box::new(hacker_news::HackerNewsAdapter::new(fetcher.clone(), settings)),
            Box::new(v2ex::V2exAdapter::new(fetcher, settings)),
        ];
        Ok(Self::new(adapters))
    }

    pub fn all(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn get(&self, source: JobSource) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.source() == source)
            .map(|adapter| adapter.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use chrono::NaiveDate;

    use super::*;

    fn job(url: &str) -> RawJob {
        let published_at = NaiveDate::from_ymd_opt(2024, 3, 8)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        RawJob::new("Backend Engineer", "Acme", "Rust", url, published_at)
    }

    fn page(urls: &[&str], has_more: bool) -> Page {
        Page {
            batch: FetchBatch {
                jobs: urls.iter().map(|url| job(url)).collect(),
                ..FetchBatch::default()
            },
            has_more,
        }
    }

    fn unavailable(url: &str) -> AdapterError {
        AdapterError::Status {
            status: 503,
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn first_page_failure_fails_the_source() {
        let result = collect_pages(JobSource::Arbeitnow, 3, |_| {
            ready(Err::<Page, _>(unavailable("https://example.com/?page=0")))
        })
        .await;

        assert!(matches!(result, Err(AdapterError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn later_page_failure_keeps_earlier_jobs() {
        let mut requested = Vec::new();
        let batch = collect_pages(JobSource::Arbeitnow, 3, |n| {
            requested.push(n);
            ready(match n {
                0 => Ok(page(&["https://example.com/a", "https://example.com/b"], true)),
                _ => Err(unavailable("https://example.com/?page=1")),
            })
        })
        .await
        .unwrap();

        assert_eq!(requested, vec![0, 1]);
        assert_eq!(batch.jobs.len(), 2);
        assert_eq!(batch.page_errors.len(), 1);
        assert!(batch.page_errors[0].starts_with("page 1:"));
    }

    #[tokio::test]
    async fn stops_when_source_reports_no_more_pages() {
        let mut requested = Vec::new();
        let batch = collect_pages(JobSource::Arbeitnow, 5, |n| {
            requested.push(n);
            ready(Ok(page(&["https://example.com/a"], false)))
        })
        .await
        .unwrap();

        assert_eq!(requested, vec![0]);
        assert_eq!(batch.jobs.len(), 1);
        assert!(batch.page_errors.is_empty());
    }

    #[tokio::test]
    async fn stops_at_max_pages() {
        let mut requested = Vec::new();
        let batch = collect_pages(JobSource::Arbeitnow, 2, |n| {
            requested.push(n);
            let url = format!("https://example.com/{n}");
            ready(Ok(page(&[url.as_str()], true)))
        })
        .await
        .unwrap();

        assert_eq!(requested, vec![0, 1]);
        assert_eq!(batch.jobs.len(), 2);
    }

    #[test]
    fn one_readable_feed_is_enough() {
        let results = vec![
            ("https://example.com/a.rss", Err(unavailable("https://example.com/a.rss"))),
            (
                "https://example.com/b.rss",
                Ok(page(&["https://example.com/jobs/1"], false).batch),
            ),
        ];

        let batch = merge_feeds(JobSource::WeWorkRemotely, results).unwrap();

        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.page_errors.len(), 1);
        assert!(batch.page_errors[0].starts_with("https://example.com/a.rss:"));
    }

    #[test]
    fn every_feed_failing_returns_the_first_error() {
        let results = vec![
            ("https://example.com/a.rss", Err(unavailable("https://example.com/a.rss"))),
            ("https://example.com/b.rss", Err(unavailable("https://example.com/b.rss"))),
        ];

        let err = merge_feeds(JobSource::WeWorkRemotely, results).unwrap_err();

        assert!(matches!(err, AdapterError::Status { url, .. } if url.ends_with("a.rss")));
    }
}
