//! RSS job boards.
//!
//! The three feeds share one adapter and differ in where the company name
//! lives: in the title (`Company: Role` or `Role at Company`) or in a
//! `job_listing:company` extension element.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rss::{Channel, Item};

use super::http::HttpFetcher;
use super::normalize::{
    employment_type_from_label, infer_employment_type, infer_experience_level, infer_remote_type,
    non_blank, parse_datetime, parse_salary_range, strip_html,
};
use super::{
    AdapterError, AdapterSettings, FetchBatch, MalformedItem, RawJob, SourceAdapter, merge_feeds,
    utc_now,
};
use crate::domain::types::JobSource;

const WE_WORK_REMOTELY_FEEDS: &[&str] = &[
    "https://weworkremotely.com/categories/remote-programming-jobs.rss",
    "https://weworkremotely.com/categories/remote-full-stack-programming-jobs.rss",
    "https://weworkremotely.com/categories/remote-back-end-programming-jobs.rss",
    "https://weworkremotely.com/categories/remote-front-end-programming-jobs.rss",
    "https://weworkremotely.com/categories/remote-devops-sysadmin-jobs.rss",
    "https://weworkremotely.com/categories/remote-design-jobs.rss",
    "https://weworkremotely.com/categories/remote-product-jobs.rss",
    "https://weworkremotely.com/categories/remote-customer-support-jobs.rss",
    "https://weworkremotely.com/categories/remote-sales-and-marketing-jobs.rss",
    "https://weworkremotely.com/categories/remote-management-and-finance-jobs.rss",
];
const JOBSPRESSO_FEEDS: &[&str] = &["https://jobspresso.co/?feed=job_feed"];
const REAL_WORK_FROM_ANYWHERE_FEEDS: &[&str] = &["https://www.realworkfromanywhere.com/rss.xml"];

/// Where a feed keeps the company name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    /// `Acme: Senior Engineer`
    CompanyColonRole,
    /// `Senior Engineer at Acme`
    RoleAtCompany,
    /// Title is the role only; company comes from feed extensions.
    RoleOnly,
}

fn extension_value<'a>(item: &'a Item, prefix: &str, name: &str) -> Option<&'a str> {
    item.extensions()
        .get(prefix)?
        .get(name)?
        .first()?
        .value()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn split_title(style: TitleStyle, title: &str) -> (String, Option<String>) {
    let split = match style {
        TitleStyle::CompanyColonRole => title
            .split_once(':')
            .map(|(company, role)| (role.trim(), company.trim())),
        TitleStyle::RoleAtCompany => title
            .rsplit_once(" at ")
            .map(|(role, company)| (role.trim(), company.trim())),
        TitleStyle::RoleOnly => None,
    };
    match split {
        Some((role, company)) if !role.is_empty() && !company.is_empty() => {
            (role.to_string(), Some(company.to_string()))
        }
        _ => (title.trim().to_string(), None),
    }
}

fn item_to_raw_job(
    style: TitleStyle,
    item: &Item,
    now: NaiveDateTime,
) -> Result<RawJob, MalformedItem> {
    let url = item
        .link()
        .or_else(|| item.guid().filter(|g| g.is_permalink()).map(|g| g.value()))
        .and_then(|u| non_blank(Some(u)));
    let reference = url.clone().unwrap_or_else(|| "feed item".into());
    let malformed = |reason: &str| MalformedItem::new(&reference, reason);

    let url = url.ok_or_else(|| malformed("missing link"))?;
    let raw_title = item
        .title()
        .map(|t| strip_html(t))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("missing title"))?;
    let (title, company) = split_title(style, &raw_title);
    let company = company
        .or_else(|| extension_value(item, "job_listing", "company").map(str::to_string))
        .or_else(|| {
            item.dublin_core_ext()
                .and_then(|dc| dc.creators().first())
                .and_then(|c| non_blank(Some(c.as_str())))
        })
        .ok_or_else(|| malformed("missing company"))?;
    let published_at = match item.pub_date() {
        Some(date) => parse_datetime(date).ok_or_else(|| malformed("unreadable pubDate"))?,
        // Feeds without dates only carry current postings.
        None => now,
    };

    let html = item.content().or(item.description()).unwrap_or_default();
    let description = strip_html(html);
    let location = extension_value(item, "job_listing", "location").map(str::to_string);
    let job_type = extension_value(item, "job_listing", "job_type");

    let mut job = RawJob::new(title, company, description, url, published_at);
    job.employment_type = job_type
        .and_then(employment_type_from_label)
        .or_else(|| Some(infer_employment_type(&job.title)));
    job.remote_type = Some(infer_remote_type(&format!(
        "{} {}",
        job.title,
        location.as_deref().unwrap_or("remote")
    )));
    job.experience_level = infer_experience_level(&job.title);
    if let Some(range) = parse_salary_range(&job.description) {
        job.salary_min = Some(range.min);
        job.salary_max = Some(range.max);
        job.currency = range.currency;
    }
    job.location = location;
    job.tags = item
        .categories()
        .iter()
        .filter_map(|c| non_blank(Some(c.name())))
        .collect();
    Ok(job)
}

/// Parses an RSS document into postings.
pub fn parse_feed(
    style: TitleStyle,
    body: &[u8],
    now: NaiveDateTime,
    settings: &AdapterSettings,
) -> Result<FetchBatch, AdapterError> {
    let channel = Channel::read_from(body)?;
    let mut batch = FetchBatch::default();
    for item in channel.items() {
        batch.record(item_to_raw_job(style, item, now), settings, now);
    }
    Ok(batch)
}

pub struct RssFeedAdapter {
    source: JobSource,
    style: TitleStyle,
    feeds: &'static [&'static str],
    fetcher: HttpFetcher,
    settings: AdapterSettings,
}

impl RssFeedAdapter {
    pub fn we_work_remotely(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self {
            source: JobSource::WeWorkRemotely,
            style: TitleStyle::CompanyColonRole,
            feeds: WE_WORK_REMOTELY_FEEDS,
            fetcher,
            settings,
        }
    }

    pub fn jobspresso(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self {
            source: JobSource::Jobspresso,
            style: TitleStyle::RoleOnly,
            feeds: JOBSPRESSO_FEEDS,
            fetcher,
            settings,
        }
    }

    pub fn real_work_from_anywhere(fetcher: HttpFetcher, settings: AdapterSettings) -> Self {
        Self {
            source: JobSource::RealWorkFromAnywhere,
            style: TitleStyle::RoleAtCompany,
            feeds: REAL_WORK_FROM_ANYWHERE_FEEDS,
            fetcher,
            settings,
        }
    }

    async fn fetch_feed(&self, url: &str) -> Result<FetchBatch, AdapterError> {
        let body = self.fetcher.get_text(url, &[]).await?;
        parse_feed(self.style, body.as_bytes(), utc_now(), &self.settings)
    }
}

#[async_trait]
impl SourceAdapter for RssFeedAdapter {
    fn source(&self) -> JobSource {
        self.source
    }

    /// Reads every feed; the source fails only when no feed could be read.
    async fn fetch_recent(&self) -> Result<FetchBatch, AdapterError> {
        let mut results = Vec::with_capacity(self.feeds.len());
        for url in self.feeds {
            results.push((*url, self.fetch_feed(url).await));
        }
        merge_feeds(self.source, results)
    }
}
