use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CrawlLogId, CrawlStatus, CrawlTrigger, JobSource};

/// Append-only record of one coordinator run for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlLog {
    pub id: CrawlLogId,
    pub source: JobSource,
    pub status: CrawlStatus,
    pub trigger: CrawlTrigger,
    /// Identity of whoever started a manual run.
    pub actor: Option<String>,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCrawlLog {
    pub source: JobSource,
    pub status: CrawlStatus,
    pub trigger: CrawlTrigger,
    pub actor: Option<String>,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
}
