use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    infer_employment_type, infer_experience_level, infer_remote_type, non_blank, parse_datetime,
    required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, decode_item,
    utc_now,
};
use crate::domain::types::JobSource;

const API_URL: &str = "https://www.workingnomads.com/api/exposed_jobs/";

#[derive(Debug, Deserialize)]
struct WorkingNomadsJob {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    company_name: Option<String>,
    category_name: Option<String>,
    /// Comma separated.
    tags: Option<String>,
    location: Option<String>,
    pub_date: Option<String>,
}

impl WorkingNomadsJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self.url.clone().unwrap_or_else(|| "working nomads item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.title.as_deref(), "title").map_err(malformed)?;
        let company = required(self.company_name.as_deref(), "company_name").map_err(malformed)?;
        let url = required(self.url.as_deref(), "url").map_err(malformed)?;
        let published_at = self
            .pub_date
            .as_deref()
            .and_then(parse_datetime)
            .ok_or_else(|| malformed("missing pub_date".into()))?;

        let description = strip_html(self.description.as_deref().unwrap_or_default());
        let location = non_blank(self.location.as_deref());

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = Some(infer_employment_type(&job.title));
        job.remote_type = Some(infer_remote_type(location.as_deref().unwrap_or("remote")));
        job.experience_level = infer_experience_level(&job.title);
        job.location = location;
        job.tags = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(category) = non_blank(self.category_name.as_deref()) {
            job.tags.push(category);
        }
        Ok(job)
    }
}

pub fn parse_working_nomads(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let items: Vec<serde_json::Value> = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in items {
        let item = decode_item::<WorkingNomadsJob>(value, "working nomads item")
            .and_then(WorkingNomadsJob::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(batch)
}

pub struct WorkingNomadsAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl WorkingNomadsAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for WorkingNomadsAdapter {
    fn source(&self) -> JobSource {
        JobSource::WorkingNomads
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let body = self.fetcher.get_text(API_URL, &[]).await?;
        parse_working_nomads(&body, utc_now(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_separated_tags() {
        let now = parse_datetime("2024-03-10 00:00:00").unwrap();
        let body = r#"[{
            "url": "https://www.workingnomads.com/jobs/go-engineer-gopher",
            "title": "Go Engineer",
            "description": "<p>gRPC services</p>",
            "company_name": "Gopher Inc",
            "category_name": "Development",
            "tags": "go, grpc, ,kubernetes",
            "location": "Anywhere",
            "pub_date": "2024-03-05T09:00:00-05:00"
        }]"#;
        let batch = parse_working_nomads(body, now, &AdapterSettings::default()).unwrap();
        let job = &batch.jobs[0];
        assert_eq!(job.tags, vec!["go", "grpc", "kubernetes", "Development"]);
        assert_eq!(
            job.published_at,
            parse_datetime("2024-03-05 14:00:00").unwrap()
        );
    }
}
