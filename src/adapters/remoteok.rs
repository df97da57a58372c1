use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    from_unix, infer_employment_type, infer_experience_level, infer_remote_type, non_blank,
    parse_datetime, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, decode_item,
    utc_now,
};
use crate::domain::types::JobSource;

const API_URL: &str = "https://remoteok.com/api";

#[derive(Debug, Deserialize)]
struct RemoteOkItem {
    slug: Option<String>,
    epoch: Option<i64>,
    date: Option<String>,
    company: Option<String>,
    company_logo: Option<String>,
    position: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    description: Option<String>,
    location: Option<String>,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    url: Option<String>,
    apply_url: Option<String>,
}

impl RemoteOkItem {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self.slug.clone().unwrap_or_else(|| "remoteok item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.position.as_deref(), "position").map_err(malformed)?;
        let company = required(self.company.as_deref(), "company").map_err(malformed)?;
        let url = required(self.url.as_deref(), "url").map_err(malformed)?;
        let published_at = self
            .epoch
            .and_then(from_unix)
            .or_else(|| self.date.as_deref().and_then(parse_datetime))
            .ok_or_else(|| malformed("missing publication date".into()))?;

        let description = strip_html(self.description.as_deref().unwrap_or_default());
        let location = non_blank(self.location.as_deref());
        let label = format!("{title} {}", self.tags.join(" "));

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = Some(infer_employment_type(&label));
        job.remote_type = Some(infer_remote_type(location.as_deref().unwrap_or("remote")));
        job.experience_level = infer_experience_level(&job.title);
        job.location = location;
        job.company_logo = non_blank(self.company_logo.as_deref());
        job.apply_url = non_blank(self.apply_url.as_deref());
        // RemoteOK reports 0 for unknown salaries.
        job.salary_min = self.salary_min.filter(|v| *v > 0).and_then(|v| i32::try_from(v).ok());
        job.salary_max = self.salary_max.filter(|v| *v > 0).and_then(|v| i32::try_from(v).ok());
        if job.salary_min.is_some() || job.salary_max.is_some() {
            job.currency = Some("USD".into());
        }
        job.tags = self.tags;
        Ok(job)
    }
}

/// Parses the RemoteOK feed, a JSON array whose first element is a legal notice.
pub fn parse_remoteok(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let items: Vec<serde_json::Value> = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in items {
        if value.get("legal").is_some() && value.get("position").is_none() {
            continue;
        }
        let item = decode_item::<RemoteOkItem>(value, "remoteok item")
            .and_then(RemoteOkItem::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(batch)
}

pub struct RemoteOkAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl RemoteOkAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn source(&self) -> JobSource {
        JobSource::RemoteOk
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let body = self.fetcher.get_text(API_URL, &[]).await?;
        parse_remoteok(&body, utc_now(), &self.settings)
    }
}
