//! Ingestion coordinator.
//!
//! Runs adapters one after another and persists their postings. Every source
//! is isolated: an adapter error becomes a FAILED crawl log and the run moves
//! on to the next source.

use std::time::{Duration, Instant};

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::adapters::normalize::{infer_employment_type, infer_remote_type, is_recent};
use crate::adapters::{AdapterRegistry, FetchBatch, RawJob, SourceAdapter};
use crate::classifier::{Classifier, extract_skills};
use crate::domain::crawl_log::NewCrawlLog;
use crate::domain::job::NewJobPosting;
use crate::domain::types::{
    ApplyMethod, CompanyName, CrawlStatus, CrawlTrigger, JobId, JobSource, JobStatus, JobTitle,
    LogoUrl, SalaryAmount, SkillName, SourceUrl, TypeConstraintError, WebsiteUrl,
};
use crate::repository::{CrawlLogWriter, JobWriter, TaxonomyReader};

use super::{ServiceError, ServiceResult};

/// Error messages kept on a crawl log row.
const MAX_LOGGED_ERRORS: usize = 5;

/// How a coordinator run was started and how it paces itself.
#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub trigger: CrawlTrigger,
    pub actor: Option<String>,
    pub recency_days: i64,
    pub inter_source_delay: Duration,
}

impl IngestionOptions {
    pub fn scheduled(recency_days: i64, inter_source_delay: Duration) -> Self {
        Self {
            trigger: CrawlTrigger::Scheduled,
            actor: None,
            recency_days,
            inter_source_delay,
        }
    }

    pub fn manual(actor: Option<String>, recency_days: i64) -> Self {
        Self {
            trigger: CrawlTrigger::Manual,
            actor,
            recency_days,
            inter_source_delay: Duration::ZERO,
        }
    }
}

/// Result of one source within a run; mirrors the crawl log row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceOutcome {
    pub source: JobSource,
    pub status: CrawlStatus,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    /// Postings inserted by this run, a subset of `success_count`.
    pub new_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    pub sources: Vec<SourceOutcome>,
    pub new_job_ids: Vec<JobId>,
}

/// Converts an adapter item into a posting ready for insertion plus its skills.
pub fn normalize_raw_job(
    raw: RawJob,
    source: JobSource,
    classifier: &Classifier,
) -> Result<(NewJobPosting, Vec<SkillName>), TypeConstraintError> {
    let title = JobTitle::new(raw.title)?;
    let company_name = CompanyName::new(raw.company_name)?;
    let source_url = SourceUrl::new(raw.source_url)?;
    let apply_method = match raw.apply_url {
        Some(apply) => ApplyMethod::new(apply)?,
        None => ApplyMethod::new(source_url.as_str())?,
    };

    let skill_text = format!("{title}\n{}\n{}", raw.description, raw.tags.join("\n"));
    let skills = extract_skills(&skill_text)
        .into_iter()
        .map(SkillName::new)
        .collect::<Result<Vec<_>, _>>()?;

    let heuristic_text = format!("{title}\n{}", raw.description);
    let employment_type = raw
        .employment_type
        .unwrap_or_else(|| infer_employment_type(&heuristic_text));
    let remote_type = raw.remote_type.unwrap_or_else(|| {
        infer_remote_type(&format!(
            "{}\n{heuristic_text}",
            raw.location.as_deref().unwrap_or("")
        ))
    });
    let category_id = classifier.classify(&title, &raw.description);

    let job = NewJobPosting {
        title,
        company_name,
        // Optional links that fail validation are dropped rather than failing the item.
        company_logo: raw.company_logo.and_then(|url| LogoUrl::new(url).ok()),
        company_website: raw.company_website.and_then(|url| WebsiteUrl::new(url).ok()),
        employment_type,
        remote_type,
        location: raw.location,
        description: raw.description,
        requirements: raw.requirements,
        apply_method,
        source,
        source_url,
        status: JobStatus::Published,
        category_id,
        experience_level: raw.experience_level,
        salary_min: raw.salary_min.and_then(|v| SalaryAmount::new(v).ok()),
        salary_max: raw.salary_max.and_then(|v| SalaryAmount::new(v).ok()),
        currency: raw.currency,
        published_at: raw.published_at,
    };
    Ok((job, skills))
}

#[derive(Default)]
struct Tally {
    total: i32,
    success: i32,
    fail: i32,
    new_ids: Vec<JobId>,
    errors: Vec<String>,
}

impl Tally {
    fn failure(&mut self, message: String) {
        self.fail += 1;
        if self.errors.len() < MAX_LOGGED_ERRORS {
            self.errors.push(message);
        }
    }

    fn error_message(&self) -> Option<String> {
        (!self.errors.is_empty()).then(|| self.errors.join("; "))
    }
}

fn store_batch<R>(
    repo: &R,
    source: JobSource,
    batch: FetchBatch,
    classifier: &Classifier,
    recency_days: i64,
    now: NaiveDateTime,
) -> Tally
where
    R: JobWriter,
{
    let mut tally = Tally::default();

    for page_error in batch.page_errors {
        tally.total += 1;
        tally.failure(page_error);
    }
    for malformed in batch.malformed {
        tally.total += 1;
        tally.failure(format!("{}: {}", malformed.reference, malformed.reason));
    }

    for raw in batch.jobs {
        if !is_recent(raw.published_at, now, recency_days) {
            continue;
        }
        tally.total += 1;
        let reference = raw.source_url.clone();
        let (job, skills) = match normalize_raw_job(raw, source, classifier) {
            Ok(normalized) => normalized,
            Err(e) => {
                tally.failure(format!("{reference}: {e}"));
                continue;
            }
        };
        match repo.insert_job_if_absent(&job, &skills) {
            Ok(Some(id)) => {
                tally.success += 1;
                tally.new_ids.push(id);
            }
            // Already stored by an earlier run.
            Ok(None) => tally.success += 1,
            Err(e) => {
                log::error!("{source}: failed to store {reference}: {e}");
                tally.failure(format!("{reference}: {e}"));
            }
        }
    }

    tally
}

/// Runs one adapter and records its crawl log. Never fails.
pub async fn ingest_source<R>(
    repo: &R,
    adapter: &dyn SourceAdapter,
    classifier: &Classifier,
    options: &IngestionOptions,
) -> (SourceOutcome, Vec<JobId>)
where
    R: JobWriter + CrawlLogWriter,
{
    let source = adapter.source();
    let started = Instant::now();

    let (status, tally) = match adapter.fetch_recent().await {
        Ok(batch) => {
            let now = Utc::now().naive_utc();
            let tally = store_batch(repo, source, batch, classifier, options.recency_days, now);
            (CrawlStatus::from_counts(tally.success, tally.fail), tally)
        }
        Err(e) => {
            log::error!("{source}: adapter failed: {e}");
            let tally = Tally {
                errors: vec![e.to_string()],
                ..Tally::default()
            };
            (CrawlStatus::Failed, tally)
        }
    };

    let outcome = SourceOutcome {
        source,
        status,
        total_count: tally.total,
        success_count: tally.success,
        fail_count: tally.fail,
        new_count: tally.new_ids.len() as i32,
        duration_ms: started.elapsed().as_millis() as i64,
        error_message: tally.error_message(),
    };

    log::info!(
        "{source}: {status} total={} success={} new={} failed={} in {}ms",
        outcome.total_count,
        outcome.success_count,
        outcome.new_count,
        outcome.fail_count,
        outcome.duration_ms
    );

    let log = NewCrawlLog {
        source,
        status,
        trigger: options.trigger,
        actor: options.actor.clone(),
        total_count: outcome.total_count,
        success_count: outcome.success_count,
        fail_count: outcome.fail_count,
        duration_ms: outcome.duration_ms,
        error_message: outcome.error_message.clone(),
    };
    if let Err(e) = repo.create_crawl_log(&log) {
        log::error!("{source}: failed to write crawl log: {e}");
    }

    (outcome, tally.new_ids)
}

/// Runs the given adapters sequentially with the configured pause between them.
pub async fn run_sources<R>(
    repo: &R,
    adapters: &[&dyn SourceAdapter],
    options: &IngestionOptions,
) -> ServiceResult<IngestionReport>
where
    R: JobWriter + CrawlLogWriter + TaxonomyReader,
{
    let classifier = Classifier::load(repo).map_err(|e| {
        log::error!("Failed to load category taxonomy: {e}");
        ServiceError::Internal
    })?;

    let mut report = IngestionReport::default();
    for (index, adapter) in adapters.iter().enumerate() {
        if index > 0 && !options.inter_source_delay.is_zero() {
            tokio::time::sleep(options.inter_source_delay).await;
        }
        let (outcome, new_ids) = ingest_source(repo, *adapter, &classifier, options).await;
        report.sources.push(outcome);
        report.new_job_ids.extend(new_ids);
    }
    Ok(report)
}

/// Crawls every registered source.
pub async fn run_all<R>(
    repo: &R,
    registry: &AdapterRegistry,
    options: &IngestionOptions,
) -> ServiceResult<IngestionReport>
where
    R: JobWriter + CrawlLogWriter + TaxonomyReader,
{
    let adapters: Vec<&dyn SourceAdapter> = registry.all().iter().map(|a| a.as_ref()).collect();
    run_sources(repo, &adapters, options).await
}

/// Crawls a single source, typically on a manual trigger.
pub async fn run_source<R>(
    repo: &R,
    registry: &AdapterRegistry,
    source: JobSource,
    options: &IngestionOptions,
) -> ServiceResult<IngestionReport>
where
    R: JobWriter + CrawlLogWriter + TaxonomyReader,
{
    let adapter = registry.get(source).ok_or(ServiceError::NotFound)?;
    run_sources(repo, &[adapter], options).await
}
