use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    employment_type_from_label, from_unix, infer_employment_type, infer_experience_level,
    infer_remote_type, non_blank, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, Page, RawJob, SourceAdapter,
    collect_pages, decode_item, utc_now,
};
use crate::domain::types::{JobSource, RemoteType};

const API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    links: Option<ArbeitnowLinks>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowLinks {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    company_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    remote: bool,
    url: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    job_types: Vec<String>,
    location: Option<String>,
    created_at: Option<i64>,
}

impl ArbeitnowJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self.slug.clone().unwrap_or_else(|| "arbeitnow item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.title.as_deref(), "title").map_err(malformed)?;
        let company = required(self.company_name.as_deref(), "company_name").map_err(malformed)?;
        let url = required(self.url.as_deref(), "url").map_err(malformed)?;
        let published_at = self
            .created_at
            .and_then(from_unix)
            .ok_or_else(|| malformed("missing created_at".into()))?;

        let description = strip_html(self.description.as_deref().unwrap_or_default());
        let location = non_blank(self.location.as_deref());

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = self
            .job_types
            .iter()
            .find_map(|t| employment_type_from_label(t))
            .or_else(|| Some(infer_employment_type(&job.title)));
        job.remote_type = Some(if self.remote {
            RemoteType::FullyRemote
        } else {
            // Arbeitnow lists office roles too; flag them as at most partly remote.
            match infer_remote_type(&format!("{} {}", job.title, job.description)) {
                RemoteType::Hybrid => RemoteType::Hybrid,
                _ => RemoteType::Occasional,
            }
        });
        job.experience_level = infer_experience_level(&job.title);
        job.location = location;
        job.tags = self.tags;
        Ok(job)
    }
}

/// Parses one page of the Arbeitnow job board API.
pub fn parse_arbeitnow_page(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<Page, AdapterError> {
    let response: ArbeitnowResponse = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in response.data {
        let item = decode_item::<ArbeitnowJob>(value, "arbeitnow item")
            .and_then(ArbeitnowJob::into_raw_job);
        batch.record(item, settings, now);
    }
    let has_more = response
        .links
        .and_then(|links| links.next)
        .is_some_and(|next| !next.is_empty());
    Ok(Page { batch, has_more })
}

pub struct ArbeitnowAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl ArbeitnowAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }

    async fn fetch_page(&self, page: u32) -> Result<Page, AdapterError> {
        let body = self
            .fetcher
            .get_text(API_URL, &[("page", (page + 1).to_string())])
            .await?;
        parse_arbeitnow_page(&body, utc_now(), &self.settings)
    }
}

#[async_trait]
impl SourceAdapter for ArbeitnowAdapter {
    fn source(&self) -> JobSource {
        JobSource::Arbeitnow
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        collect_pages(self.source(), self.settings.max_pages, |page| {
            self.fetch_page(page)
        })
        .await
    }
}
