use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    employment_type_from_label, infer_employment_type, infer_experience_level, infer_remote_type,
    non_blank, parse_datetime, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, decode_item,
    utc_now,
};
use crate::domain::types::JobSource;

const API_URL: &str = "https://jobicy.com/api/v2/remote-jobs";
const PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
struct JobicyResponse {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobicyJob {
    id: Option<i64>,
    url: Option<String>,
    job_title: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    #[serde(default)]
    job_industry: Vec<String>,
    #[serde(default)]
    job_type: Vec<String>,
    job_geo: Option<String>,
    job_level: Option<String>,
    job_excerpt: Option<String>,
    job_description: Option<String>,
    pub_date: Option<String>,
    annual_salary_min: Option<serde_json::Value>,
    annual_salary_max: Option<serde_json::Value>,
    salary_currency: Option<String>,
}

/// Jobicy sends salaries as numbers or numeric strings.
fn salary_value(value: Option<&serde_json::Value>) -> Option<i32> {
    let amount = match value? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    (amount > 0.0 && amount <= f64::from(i32::MAX)).then(|| amount.round() as i32)
}

impl JobicyJob {
    fn into_raw_job(self) -> Result<RawJob, MalformedItem> {
        let reference = self
            .id
            .map(|id| format!("jobicy #{id}"))
            .unwrap_or_else(|| "jobicy item".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.job_title.as_deref(), "jobTitle").map_err(malformed)?;
        let company = required(self.company_name.as_deref(), "companyName").map_err(malformed)?;
        let url = required(self.url.as_deref(), "url").map_err(malformed)?;
        let published_at = self
            .pub_date
            .as_deref()
            .and_then(parse_datetime)
            .ok_or_else(|| malformed("missing pubDate".into()))?;

        let html = self
            .job_description
            .as_deref()
            .or(self.job_excerpt.as_deref())
            .unwrap_or_default();
        let description = strip_html(html);
        let location = non_blank(self.job_geo.as_deref());

        let mut job = RawJob::new(title, company, description, url, published_at);
        job.employment_type = self
            .job_type
            .iter()
            .find_map(|t| employment_type_from_label(t))
            .or_else(|| Some(infer_employment_type(&job.title)));
        job.remote_type = Some(infer_remote_type(location.as_deref().unwrap_or("remote")));
        job.experience_level = self
            .job_level
            .as_deref()
            .and_then(infer_experience_level)
            .or_else(|| infer_experience_level(&job.title));
        job.location = location;
        job.company_logo = non_blank(self.company_logo.as_deref());
        job.salary_min = salary_value(self.annual_salary_min.as_ref());
        job.salary_max = salary_value(self.annual_salary_max.as_ref());
        if job.salary_min.is_some() || job.salary_max.is_some() {
            job.currency = non_blank(self.salary_currency.as_deref());
        }
        job.tags = self.job_industry.iter().map(|t| strip_html(t)).collect();
        Ok(job)
    }
}

pub fn parse_jobicy(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let response: JobicyResponse = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in response.jobs {
        let item = decode_item::<JobicyJob>(value, "jobicy item").and_then(JobicyJob::into_raw_job);
        batch.record(item, settings, now);
    }
    Ok(batch)
}

pub struct JobicyAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl JobicyAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for JobicyAdapter {
    fn source(&self) -> JobSource {
        JobSource::Jobicy
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let body = self
            .fetcher
            .get_text(API_URL, &[("count", PAGE_SIZE.to_string())])
            .await?;
        parse_jobicy(&body, utc_now(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EmploymentType, ExperienceLevel};

    #[test]
    fn parses_string_and_numeric_salaries() {
        let now = parse_datetime("2024-03-10 00:00:00").unwrap();
        let body = r#"{"jobs": [{
            "id": 7,
            "url": "https://jobicy.com/jobs/7-data-engineer",
            "jobTitle": "Data Engineer",
            "companyName": "Pipeline Co",
            "jobIndustry": ["Data Science &amp; Analytics"],
            "jobType": ["full-time"],
            "jobGeo": "USA",
            "jobLevel": "Senior",
            "jobDescription": "<p>Spark and Airflow</p>",
            "pubDate": "2024-03-09 08:00:00",
            "annualSalaryMin": "95000",
            "annualSalaryMax": 125000,
            "salaryCurrency": "USD"
        }]}"#;
        let batch = parse_jobicy(body, now, &AdapterSettings::default()).unwrap();
        let job = &batch.jobs[0];
        assert_eq!(job.salary_min, Some(95_000));
        assert_eq!(job.salary_max, Some(125_000));
        assert_eq!(job.currency.as_deref(), Some("USD"));
        assert_eq!(job.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(job.experience_level, Some(ExperienceLevel::Senior));
        assert_eq!(job.tags, vec!["Data Science & Analytics"]);
    }
}
