use serde::Deserialize;

use crate::domain::types::{CrawlStatus, CrawlTrigger, JobSource};
use crate::dto::crawl_logs::{CrawlLogDto, CrawlLogPageDto};
use crate::repository::{CrawlLogListQuery, CrawlLogReader, DEFAULT_ITEMS_PER_PAGE};

use super::ServiceResult;

/// Filters accepted by the crawl log listing. Enum values parse leniently.
#[derive(Debug, Default, Deserialize)]
pub struct CrawlLogFilters {
    pub source: Option<String>,
    pub status: Option<String>,
    pub trigger: Option<String>,
    pub actor: Option<String>,
    pub page: Option<usize>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn list_crawl_logs<R>(filters: &CrawlLogFilters, repo: &R) -> ServiceResult<CrawlLogPageDto>
where
    R: CrawlLogReader,
{
    let page = filters.page.unwrap_or(1).max(1);
    let mut query = CrawlLogListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(source) = present(&filters.source) {
        query = query.source(JobSource::try_from(source)?);
    }
    if let Some(status) = present(&filters.status) {
        query = query.status(CrawlStatus::try_from(status)?);
    }
    if let Some(trigger) = present(&filters.trigger) {
        query = query.trigger(CrawlTrigger::try_from(trigger)?);
    }
    if let Some(actor) = present(&filters.actor) {
        query = query.actor(actor);
    }

    let (total, logs) = repo.list_crawl_logs(query)?;
    Ok(CrawlLogPageDto {
        total,
        page,
        per_page: DEFAULT_ITEMS_PER_PAGE,
        items: logs.into_iter().map(CrawlLogDto::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::crawl_log::CrawlLog;
    use crate::domain::types::CrawlLogId;
    use crate::repository::test::TestRepository;
    use crate::services::ServiceError;

    fn log(id: i32, source: JobSource, trigger: CrawlTrigger, actor: Option<&str>) -> CrawlLog {
        CrawlLog {
            id: CrawlLogId::new(id).unwrap(),
            source,
            status: CrawlStatus::Success,
            trigger,
            actor: actor.map(str::to_string),
            total_count: 3,
            success_count: 3,
            fail_count: 0,
            duration_ms: 120,
            error_message: None,
            created_at: Utc::now().naive_utc() - Duration::minutes(id as i64),
        }
    }

    fn repo() -> TestRepository {
        TestRepository::new()
            .with_crawl_log(log(1, JobSource::Remotive, CrawlTrigger::Scheduled, None))
            .with_crawl_log(log(2, JobSource::V2ex, CrawlTrigger::Manual, Some("ops")))
            .with_crawl_log(log(3, JobSource::Remotive, CrawlTrigger::Manual, Some("ops")))
    }

    #[test]
    fn filters_by_source_trigger_and_actor() {
        let repo = repo();
        let filters = CrawlLogFilters {
            source: Some("remotive".into()),
            trigger: Some("manual".into()),
            actor: Some("ops".into()),
            ..CrawlLogFilters::default()
        };
        let page = list_crawl_logs(&filters, &repo).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 3);
        assert_eq!(page.items[0].source, "REMOTIVE");
        assert_eq!(page.items[0].actor.as_deref(), Some("ops"));
    }

    #[test]
    fn newest_first_without_filters() {
        let page = list_crawl_logs(&CrawlLogFilters::default(), &repo()).unwrap();
        let ids: Vec<i32> = page.items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn page_far_past_the_end_is_empty() {
        let filters = CrawlLogFilters {
            page: Some(usize::MAX),
            ..CrawlLogFilters::default()
        };
        let page = list_crawl_logs(&filters, &repo()).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.is_empty());
    }

    #[test]
    fn unknown_source_is_a_type_error() {
        let filters = CrawlLogFilters {
            source: Some("monster".into()),
            ..CrawlLogFilters::default()
        };
        assert!(matches!(
            list_crawl_logs(&filters, &repo()),
            Err(ServiceError::TypeConstraint(_))
        ));
    }
}
