//! V2EX `jobs` node.
//!
//! Topics are free-form forum posts, mostly in Chinese. Only remote-friendly
//! topics are kept; the company is taken from a bracketed title prefix such
//! as `【Acme】` when present, otherwise the poster is credited.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    contains_word, from_unix, infer_employment_type, infer_experience_level, non_blank,
    parse_salary_range, required, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, decode_item,
    utc_now,
};
use crate::domain::types::{EmploymentType, ExperienceLevel, JobSource, RemoteType};

const API_URL: &str = "https://www.v2ex.com/api/topics/show.json";
const TOPIC_URL: &str = "https://www.v2ex.com/t/";

const NON_COMPANY_BRACKETS: &[&str] = &[
    "远程", "remote", "招聘", "急招", "全职", "兼职", "实习", "外包", "内推", "北京", "上海",
    "深圳", "杭州", "广州", "成都",
];

#[derive(Debug, Deserialize)]
struct Member {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    id: Option<i64>,
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    content_rendered: Option<String>,
    created: Option<i64>,
    member: Option<Member>,
}

fn is_remote_topic(text: &str) -> bool {
    text.contains("远程") || contains_word(&text.to_lowercase(), "remote")
}

/// First bracketed title segment that names a company rather than a city or tag.
fn bracketed_company(title: &str) -> Option<String> {
    let mut rest = title;
    while let Some(start) = rest.find(['【', '[']) {
        let after = &rest[start..];
        let open_len = after.chars().next().map_or(1, char::len_utf8);
        let inner = &after[open_len..];
        let end = inner.find(['】', ']'])?;
        let candidate = inner[..end].trim();
        let lower = candidate.to_lowercase();
        if !candidate.is_empty() && !NON_COMPANY_BRACKETS.iter().any(|w| lower.contains(w)) {
            return Some(candidate.to_string());
        }
        rest = &inner[end..];
    }
    None
}

fn employment_type(text: &str) -> EmploymentType {
    if text.contains("实习") {
        EmploymentType::Internship
    } else if text.contains("兼职") {
        EmploymentType::PartTime
    } else if text.contains("外包") || text.contains("合同") {
        EmploymentType::Contract
    } else {
        infer_employment_type(text)
    }
}

fn remote_type(text: &str) -> RemoteType {
    let lower = text.to_lowercase();
    if text.contains("混合") || lower.contains("hybrid") {
        RemoteType::Hybrid
    } else if text.contains("部分远程") {
        RemoteType::Occasional
    } else {
        RemoteType::FullyRemote
    }
}

fn experience_level(title: &str) -> Option<ExperienceLevel> {
    if title.contains("资深") || title.contains("高级") {
        Some(ExperienceLevel::Senior)
    } else if title.contains("初级") {
        Some(ExperienceLevel::Entry)
    } else {
        infer_experience_level(title)
    }
}

impl Topic {
    /// `Ok(None)` for topics that are not remote-friendly.
    fn into_raw_job(self) -> Result<Option<RawJob>, MalformedItem> {
        let reference = self
            .id
            .map(|id| format!("v2ex #{id}"))
            .unwrap_or_else(|| "v2ex topic".into());
        let malformed = |reason: String| MalformedItem::new(&reference, reason);

        let title = required(self.title.as_deref(), "title").map_err(malformed)?;
        let html = self
            .content_rendered
            .as_deref()
            .or(self.content.as_deref())
            .unwrap_or_default();
        let description = strip_html(html);
        let text = format!("{title}\n{description}");
        if !is_remote_topic(&text) {
            return Ok(None);
        }

        let url = non_blank(self.url.as_deref())
            .or_else(|| self.id.map(|id| format!("{TOPIC_URL}{id}")))
            .ok_or_else(|| malformed("missing url".into()))?;
        let published_at = self
            .created
            .and_then(from_unix)
            .ok_or_else(|| malformed("missing created".into()))?;
        let company = bracketed_company(&title)
            .or_else(|| {
                self.member
                    .as_ref()
                    .and_then(|m| non_blank(m.username.as_deref()))
                    .map(|name| format!("{name} (V2EX)"))
            })
            .ok_or_else(|| malformed("missing company or poster".into()))?;

        let mut job = RawJob::new(&title, company, description, url, published_at);
        job.employment_type = Some(employment_type(&text));
        job.remote_type = Some(remote_type(&text));
        job.experience_level = experience_level(&title);
        job.location = Some("远程".into());
        if let Some(range) = parse_salary_range(&text) {
            job.salary_min = Some(range.min);
            job.salary_max = Some(range.max);
            job.currency = range.currency.or_else(|| Some("CNY".into()));
        }
        Ok(Some(job))
    }
}

pub fn parse_v2ex(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let topics: Vec<serde_json::Value> = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for value in topics {
        let item = decode_item::<Topic>(value, "v2ex topic").and_then(Topic::into_raw_job);
        match item {
            Ok(Some(job)) => batch.record(Ok(job), settings, now),
            Ok(None) => {}
            Err(malformed) => batch.malformed.push(malformed),
        }
    }
    Ok(batch)
}

pub struct V2exAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl V2exAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for V2exAdapter {
    fn source(&self) -> JobSource {
        JobSource::V2ex
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let body = self
            .fetcher
            .get_text(API_URL, &[("node_name", "jobs".to_string())])
            .await?;
        parse_v2ex(&body, utc_now(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_company_from_brackets() {
        assert_eq!(
            bracketed_company("[远程]【Acme 科技】招聘 Rust 工程师").as_deref(),
            Some("Acme 科技")
        );
        assert_eq!(bracketed_company("【北京】后端开发"), None);
        assert_eq!(bracketed_company("招聘前端"), None);
    }

    #[test]
    fn keeps_only_remote_topics() {
        let now = from_unix(1_710_000_000).unwrap();
        let body = r#"[
            {
                "id": 1001,
                "title": "【Ferris】远程 资深 Rust 后端 20k-35k",
                "url": "https://www.v2ex.com/t/1001",
                "content_rendered": "<p>全职，Tokio + Postgres</p>",
                "created": 1709900000,
                "member": {"username": "crab"}
            },
            {
                "id": 1002,
                "title": "上海 前端实习生",
                "content": "坐班",
                "created": 1709900000,
                "member": {"username": "someone"}
            },
            {
                "id": 1003,
                "title": "remote part-time designer",
                "created": 1709900000,
                "member": {"username": "studio"}
            }
        ]"#;
        let batch = parse_v2ex(body, now, &AdapterSettings::default()).unwrap();
        assert_eq!(batch.jobs.len(), 2);

        let rust = &batch.jobs[0];
        assert_eq!(rust.company_name, "Ferris");
        assert_eq!(rust.experience_level, Some(ExperienceLevel::Senior));
        assert_eq!(rust.salary_min, Some(20_000));
        assert_eq!(rust.salary_max, Some(35_000));
        assert_eq!(rust.currency.as_deref(), Some("CNY"));

        let designer = &batch.jobs[1];
        assert_eq!(designer.company_name, "studio (V2EX)");
        assert_eq!(designer.source_url, "https://www.v2ex.com/t/1003");
        assert_eq!(designer.employment_type, Some(EmploymentType::PartTime));
    }
}
