use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    infer_employment_type, infer_experience_level, infer_remote_type, parse_datetime, required,
    strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, Page, RawJob, SourceAdapter,
    collect_pages, decode_item, utc_now,
};
use crate::domain::types::JobSource;

const API_URL: &str = "https://www.themuse.com/api/public/jobs";
const REMOTE_LOCATION: &str = "Flexible / Remote";

#[derive(Debug, Deserialize)]
struct MuseResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    page_count: u32,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuseRefs {
    landing_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuseJob {
    id: Option<i64>,
    name: Option<String>,
    contents: Option<String>,
    publication_date: Option<String>,
    company: Option<Named>,
    #[serde(default)]
    levels: Vec<Named>,
    #[serde(default)]
    locations: Vec<Named>,
    #[serde(default)]
    categories: Vec<Named>,
    refs: Option<MuseRefs>,
}

fn names(values: &[Named]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.name.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl MuseJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self
            .id
            .map(|id| format!("the muse #{id}"))
            .unwrap_or_else(|| "the muse item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.name.as_deref(), "name").map_err(malformed)?;
        let company = required(
            self.company.as_ref().and_then(|c| c.name.as_deref()),
            "company",
        )
        .map_err(malformed)?;
        let url = required(
            self.refs.as_ref().and_then(|r| r.landing_page.as_deref()),
            "refs.landing_page",
        )
        .map_err(malformed)?;
        let published_at = self
            .publication_date
            .as_deref()
            .and_then(parse_datetime)
            .ok_or_else(|| malformed("missing publication_date".into()))?;

        let description = strip_html(self.contents.as_deref().unwrap_or_default());
        let levels = names(&self.levels);
        let locations = names(&self.locations);

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = Some(infer_employment_type(&format!(
            "{} {}",
            job.title,
            levels.join(" ")
        )));
        job.remote_type = Some(infer_remote_type(&locations.join(" ")));
        job.experience_level = levels
            .iter()
            .find_map(|l| infer_experience_level(l))
            .or_else(|| infer_experience_level(&job.title));
        if !locations.is_empty() {
            job.location = Some(locations.join(", "));
        }
        job.tags = names(&self.categories);
        Ok(job)
    }
}

pub fn parse_the_muse_page(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<Page, AdapterError> {
    let response: MuseResponse = decode_json(body)?;
    let has_more = response.page + 1 < response.page_count;
    let mut batch = FetchBatch::default();
    for value in response.results {
        let item = decode_item::<MuseJob>(value, "the muse item").and_then(MuseJob::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(Page { batch, has_more })
}

pub struct TheMuseAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl TheMuseAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }

    async fn fetch_page(&self, page: u32) -> Result<Page, AdapterError> {
        let body = self
            .fetcher
            .get_text(
                API_URL,
                &[
                    ("page", page.to_string()),
                    ("location", REMOTE_LOCATION.to_string()),
                ],
            )
            .await?;
        parse_the_muse_page(&body, utc_now(), &self.settings)
    }
}

#[async_trait]
impl SourceAdapter for TheMuseAdapter {
    fn source(&self) -> JobSource {
        JobSource::TheMuse
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        collect_pages(self.source(), self.settings.max_pages, |page| {
            self.fetch_page(page)
        })
        .await
    }
}
