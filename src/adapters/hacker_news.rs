//! Hacker News "Ask HN: Who is hiring?" threads, read through the Algolia API.
//!
//! Each top-level comment is one posting whose first paragraph is a
//! `Company | Role | Location | ...` header.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::http::{HttpFetcher, decode_json};
use super::normalize::{
    from_unix, infer_employment_type, infer_experience_level, infer_remote_type,
    parse_forum_header, parse_salary_range, strip_html,
};
use super::{AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, utc_now};
use crate::domain::types::JobSource;

const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search_by_date";
const ITEM_URL: &str = "https://hn.algolia.com/api/v1/items";
const ITEM_PERMALINK: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    #[serde(default)]
    children: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    id: i64,
    author: Option<String>,
    text: Option<String>,
    created_at_i: Option<i64>,
}

/// Picks the newest hiring thread from a `search_by_date` response.
pub fn latest_thread_id(body: &str) -> Result<Option<String>, AdapterError> {
    let response: SearchResponse = decode_json(body)?;
    Ok(response
        .hits
        .into_iter()
        .find(|hit| {
            hit.title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("who is hiring"))
        })
        .map(|hit| hit.object_id))
}

fn header_html(text: &str) -> &str {
    match text.find("<p>") {
        Some(end) => &text[..end],
        None => text,
    }
}

fn comment_to_raw_job(comment: &Comment, text: &str) -> Result<RawJob, MalformedItem> {
    let url = format!("{ITEM_PERMALINK}{}", comment.id);
    let header_line = strip_html(header_html(text));
    let header = parse_forum_header(&header_line)
        .ok_or_else(|| MalformedItem::new(&url, "no Company | Role header"))?;
    let published_at = comment
        .created_at_i
        .and_then(from_unix)
        .ok_or_else(|| MalformedItem::new(&url, "missing created_at_i"))?;

    let description = strip_html(text);
    let mut job = RawJob::new(header.title, header.company, description, &url, published_at);
    job.employment_type = Some(infer_employment_type(&header_line));
    job.remote_type = Some(infer_remote_type(&header_line));
    job.experience_level = infer_experience_level(&job.title);
    job.location = header.location;
    job.company_website = header.website;
    job.apply_url = Some(url);
    if let Some(range) = parse_salary_range(&header_line) {
        job.salary_min = Some(range.min);
        job.salary_max = Some(range.max);
        job.currency = range.currency;
    }
    Ok(job)
}

/// Parses the comment tree of a hiring thread.
///
/// Deleted comments carry no author or text and are skipped silently.
pub fn parse_hacker_news_thread(
    body: &str,
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let thread: ThreadItem = decode_json(body)?;
    let mut batch = FetchBatch::default();
    for comment in &thread.children {
        let Some(text) = comment.text.as_deref().filter(|_| comment.author.is_some()) else {
            continue;
        };
        batch.record(comment_to_raw_job(comment, text), settings, now);
    }
    Ok(batch)
}

pub struct HackerNewsAdapter {
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl HackerNewsAdapter {
    pub fn new(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn source(&self) -> JobSource {
        JobSource::HackerNews
    }

    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let search = self
            .fetcher
            .get_text(
                SEARCH_URL,
                &[
                    ("tags", "story,author_whoishiring".to_string()),
                    ("hitsPerPage", "10".to_string()),
                ],
            )
            .await?;
        let Some(thread_id) = latest_thread_id(&search)? else {
            log::info!("hacker news: no hiring thread found");
            return Ok(FetchBatch::default());
        };
        let body = self
            .fetcher
            .get_text(&format!("{ITEM_URL}/{thread_id}"), &[])
            .await?;
        parse_hacker_news_thread(&body, utc_now(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EmploymentType, ExperienceLevel, RemoteType};

    #[test]
    fn finds_latest_hiring_thread() {
        let body = r#"{"hits": [
            {"objectID": "1", "title": "Ask HN: Who wants to be hired? (March 2024)"},
            {"objectID": "2", "title": "Ask HN: Who is hiring? (March 2024)"},
            {"objectID": "3", "title": "Ask HN: Who is hiring? (February 2024)"}
        ]}"#;
        assert_eq!(latest_thread_id(body).unwrap().as_deref(), Some("2"));
        assert_eq!(latest_thread_id(r#"{"hits": []}"#).unwrap(), None);
    }

    #[test]
    fn parses_comment_headers() {
        let now = from_unix(1_710_000_000).unwrap();
        let body = r#"{"id": 2, "children": [
            {
                "id": 101,
                "author": "founder",
                "created_at_i": 1709400000,
                "text": "Acme Robotics | Senior Rust Engineer | REMOTE (US) | Full-time | $150k-$180k<p>We build robots with Rust &amp; Tokio.<p>Email jobs@acme.example"
            },
            {"id": 102, "author": null, "text": null, "created_at_i": 1709400000},
            {"id": 103, "author": "someone", "text": "Great thread, thanks!", "created_at_i": 1709400000}
        ]}"#;
        let batch = parse_hacker_news_thread(body, now, &AdapterSettings::default()).unwrap();
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.malformed.len(), 1);
        assert_eq!(
            batch.malformed[0].reference,
            "https://news.ycombinator.com/item?id=103"
        );

        let job = &batch.jobs[0];
        assert_eq!(job.company_name, "Acme Robotics");
        assert_eq!(job.title, "Senior Rust Engineer");
        assert_eq!(job.source_url, "https://news.ycombinator.com/item?id=101");
        assert_eq!(job.location.as_deref(), Some("REMOTE (US)"));
        assert_eq!(job.remote_type, Some(RemoteType::FullyRemote));
        assert_eq!(job.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(job.experience_level, Some(ExperienceLevel::Senior));
        assert_eq!(job.salary_min, Some(150_000));
        assert_eq!(job.salary_max, Some(180_000));
        assert!(job.description.contains("We build robots with Rust & Tokio."));
    }
}
