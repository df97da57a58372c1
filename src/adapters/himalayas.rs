use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    employment_type_from_label, from_unix, infer_employment_type, infer_experience_level,
    non_blank, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, Page, RawJob, SourceAdapter,
    collect_pages, decode_item, utc_now,
};
use crate::domain::types::{JobSource, RemoteType};

const API_URL: &str = "https://himalayas.app/jobs/api";
const PAGE_SIZE: usize = 20;

#[derive(Debug, Deserialize)]
struct HimalayasResponse {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HimalayasJob {
    title: Option<String>,
    excerpt: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    employment_type: Option<String>,
    min_salary: Option<f64>,
    max_salary: Option<f64>,
    currency: Option<String>,
    #[serde(default)]
    seniority: Vec<String>,
    #[serde(default)]
    location_restrictions: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    description: Option<String>,
    pub_date: Option<i64>,
    application_link: Option<String>,
    guid: Option<String>,
}

fn salary(value: Option<f64>) -> Option<i32> {
    value
        .filter(|v| *v > 0.0 && *v <= f64::from(i32::MAX))
        .map(|v| v.round() as i32)
}

impl HimalayasJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self.guid.clone().unwrap_or_else(|| "himalayas item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.title.as_deref(), "title").map_err(malformed)?;
        let company = required(self.company_name.as_deref(), "companyName").map_err(malformed)?;
        let url = required(self.guid.as_deref(), "guid").map_err(malformed)?;
        let published_at = self
            .pub_date
            .and_then(from_unix)
            .ok_or_else(|| malformed("missing pubDate".into()))?;

        let html = self
            .description
            .as_deref()
            .or(self.excerpt.as_deref())
            .unwrap_or_default();

        let mut job = RawJob::new(title, company, strip_html(html), url, published_at);
        job.employment_type = self
            .employment_type
            .as_deref()
            .and_then(employment_type_from_label)
            .or_else(|| Some(infer_employment_type(&job.title)));
        // Himalayas only lists remote roles; restrictions are about geography.
        job.remote_type = Some(RemoteType::FullyRemote);
        job.experience_level = self
            .seniority
            .iter()
            .find_map(|s| infer_experience_level(s))
            .or_else(|| infer_experience_level(&job.title));
        job.location = if self.location_restrictions.is_empty() {
            Some("Worldwide".into())
        } else {
            Some(self.location_restrictions.join(", "))
        };
        job.company_logo = non_blank(self.company_logo.as_deref());
        job.apply_url = non_blank(self.application_link.as_deref());
        job.salary_min = salary(self.min_salary);
        job.salary_max = salary(self.max_salary);
        if job.salary_min.is_some() || job.salary_max.is_some() {
            job.currency = non_blank(self.currency.as_deref());
        }
        job.tags = self.categories;
        Ok(job)
    }
}

/// Parses one offset page; a full page means more may follow.
pub fn parse_himalayas_page(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<Page, AdapterError> {
    let response: HimalayasResponse = decode_json(body)?;
    let has_more = response.jobs.len() >= PAGE_SIZE;
    let mut batch = FetchBatch::default();
    for value in response.jobs {
        let item = decode_item::<HimalayasJob>(value, "himalayas item")
            .and_then(HimalayasJob::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(Page { batch, has_more })
}

pub struct HimalayasAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl HimalayasAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }

    async fn fetch_page(&self, page: u32) -> Result<Page, AdapterError> {
        let offset = page as usize * PAGE_SIZE;
        let body = self
            .fetcher
            .get_text(
                API_URL,
                &[("limit", PAGE_SIZE.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        parse_himalayas_page(&body, utc_now(), &self.settings)
    }
}

#[async_trait]
impl SourceAdapter for HimalayasAdapter {
    fn source(&self) -> JobSource {
        JobSource::Himalayas
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        collect_pages(self.source(), self.settings.max_pages, |page| {
            self.fetch_page(page)
        })
        .await
    }
}
