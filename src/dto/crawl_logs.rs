use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::crawl_log::CrawlLog;

/// Crawl log row as returned by the administrative read path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlLogDto {
    pub id: i32,
    pub source: &'static str,
    pub status: &'static str,
    pub trigger: &'static str,
    pub actor: Option<String>,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<CrawlLog> for CrawlLogDto {
    fn from(value: CrawlLog) -> Self {
        Self {
            id: value.id.get(),
            source: value.source.as_str(),
            status: value.status.as_str(),
            trigger: value.trigger.as_str(),
            actor: value.actor,
            total_count: value.total_count,
            success_count: value.success_count,
            fail_count: value.fail_count,
            duration_ms: value.duration_ms,
            error_message: value.error_message,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlLogPageDto {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub items: Vec<CrawlLogDto>,
}
