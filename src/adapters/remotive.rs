use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    employment_type_from_label, infer_employment_type, infer_experience_level, infer_remote_type,
    non_blank, parse_datetime, parse_salary_range, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, decode_item,
    utc_now,
};
use crate::domain::types::JobSource;

const API_URL: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    id: Option<i64>,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    job_type: Option<String>,
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
    description: Option<String>,
}

impl RemotiveJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self
            .id
            .map(|id| format!("remotive #{id}"))
            .unwrap_or_else(|| "remotive item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.title.as_deref(), "title").map_err(malformed)?;
        let company = required(self.company_name.as_deref(), "company_name").map_err(malformed)?;
        let url = required(self.url.as_deref(), "url").map_err(malformed)?;
        let published_at = self
            .publication_date
            .as_deref()
            .and_then(parse_datetime)
            .ok_or_else(|| malformed("missing publication_date".into()))?;

        let description = strip_html(self.description.as_deref().unwrap_or_default());
        let location = non_blank(self.candidate_required_location.as_deref());

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = self
            .job_type
            .as_deref()
            .and_then(employment_type_from_label)
            .or_else(|| Some(infer_employment_type(&job.title)));
        job.remote_type = Some(infer_remote_type(location.as_deref().unwrap_or("remote")));
        job.experience_level = infer_experience_level(&job.title);
        job.location = location;
        job.company_logo = non_blank(self.company_logo.as_deref());
        if let Some(range) = self.salary.as_deref().and_then(parse_salary_range) {
            job.salary_min = Some(range.min);
            job.salary_max = Some(range.max);
            job.currency = range.currency;
        }
        job.tags = self.tags;
        if let Some(category) = non_blank(self.category.as_deref()) {
            job.tags.push(category);
        }
        Ok(job)
    }
}

pub fn parse_remotive(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let response: RemotiveResponse = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in response.jobs {
        let item =
            decode_item::<RemotiveJob>(value, "remotive item").and_then(RemotiveJob::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(batch)
}

pub struct RemotiveAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl RemotiveAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    fn source(&self) -> JobSource {
        JobSource::Remotive
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let body = self.fetcher.get_text(API_URL, &[]).await?;
        parse_remotive(&body, utc_now(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EmploymentType, RemoteType};

    fn now() -> NaiveDateTime {
        parse_datetime("2024-03-10 00:00:00").unwrap()
    }

    #[test]
    fn parses_jobs_with_salary_text() {
        let body = r#"{"job-count": 2, "jobs": [
            {
                "id": 101,
                "url": "https://remotive.com/remote-jobs/software-dev/rust-101",
                "title": "Backend Developer",
                "company_name": "Ferris Labs",
                "category": "Software Development",
                "tags": ["rust", "postgres"],
                "job_type": "contract",
                "publication_date": "2024-03-08T10:00:00",
                "candidate_required_location": "Europe, hybrid",
                "salary": "$90k - $110k",
                "description": "<div>Rust &amp; Postgres</div>"
            },
            {"id": 102, "title": "No company", "url": "https://remotive.com/x", "publication_date": "2024-03-08T10:00:00"}
        ]}"#;
        let batch = parse_remotive(body, now(), &AdapterSettings::default()).unwrap();
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.malformed.len(), 1);
        assert_eq!(batch.malformed[0].reference, "remotive #102");

        let job = &batch.jobs[0];
        assert_eq!(job.description, "Rust & Postgres");
        assert_eq!(job.employment_type, Some(EmploymentType::Contract));
        assert_eq!(job.remote_type, Some(RemoteType::Hybrid));
        assert_eq!(job.salary_min, Some(90_000));
        assert_eq!(job.salary_max, Some(110_000));
        assert_eq!(job.currency.as_deref(), Some("USD"));
        assert!(job.tags.contains(&"Software Development".to_string()));
    }
}
