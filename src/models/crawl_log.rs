use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::crawl_log::{CrawlLog as DomainCrawlLog, NewCrawlLog as DomainNewCrawlLog};
use crate::domain::types::{CrawlStatus, CrawlTrigger, JobSource, TypeConstraintError};

/// Diesel representation of a crawl log row.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::crawl_logs)]
pub struct CrawlLog {
    pub id: i32,
    pub source: String,
    pub status: String,
    pub trigger_kind: String,
    pub actor: Option<String>,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::crawl_logs)]
pub struct NewCrawlLog<'a> {
    pub source: &'static str,
    pub status: &'static str,
    pub trigger_kind: &'static str,
    pub actor: Option<&'a str>,
    pub total_count: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub duration_ms: i64,
    pub error_message: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<CrawlLog> for DomainCrawlLog {
    type Error = TypeConstraintError;

    fn try_from(log: CrawlLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: log.id.try_into()?,
            source: JobSource::try_from(log.source)?,
            status: CrawlStatus::try_from(log.status)?,
            trigger: CrawlTrigger::try_from(log.trigger_kind)?,
            actor: log.actor,
            total_count: log.total_count,
            success_count: log.success_count,
            fail_count: log.fail_count,
            duration_ms: log.duration_ms,
            error_message: log.error_message,
            created_at: log.created_at,
        })
    }
}

impl<'a> NewCrawlLog<'a> {
    pub fn from_domain(log: &'a DomainNewCrawlLog, now: NaiveDateTime) -> Self {
        Self {
            source: log.source.as_str(),
            status: log.status.as_str(),
            trigger_kind: log.trigger.as_str(),
            actor: log.actor.as_deref(),
            total_count: log.total_count,
            success_count: log.success_count,
            fail_count: log.fail_count,
            duration_ms: log.duration_ms,
            error_message: log.error_message.as_deref(),
            created_at: now,
        }
    }
}
