use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::{DbConnection, DbPool};
use crate::domain::crawl_log::{CrawlLog, NewCrawlLog};
use crate::domain::job::{JobPosting, NewJobPosting};
use crate::domain::notification::{DueNotification, NewNotification};
use crate::domain::subscription::{NewSubscription, Subscription};
use crate::domain::taxonomy::Category;
use crate::domain::types::{
    CategoryId, CrawlLogId, CrawlStatus, CrawlTrigger, JobId, JobSource, NotificationId,
    SkillName, SubscriptionId, UserId,
};

pub mod crawl_log;
pub mod errors;
pub mod job;
pub mod notification;
pub mod retention;
pub mod subscription;
pub mod taxonomy;

pub use errors::{RepositoryError, RepositoryResult};

/// Default page size of administrative listings.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows to skip; saturates for pages beyond any realistic table size.
    pub fn offset(&self) -> i64 {
        let skipped = (self.page.max(1) - 1).saturating_mul(self.per_page);
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Query parameters for the administrative crawl log listing.
#[derive(Debug, Clone, Default)]
pub struct CrawlLogListQuery {
    pub source: Option<JobSource>,
    pub status: Option<CrawlStatus>,
    pub trigger: Option<CrawlTrigger>,
    pub actor: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CrawlLogListQuery {
    pub fn source(mut self, source: JobSource) -> Self {
        self.source = Some(source);
        self
    }
    pub fn status(mut self, status: CrawlStatus) -> Self {
        self.status = Some(status);
        self
    }
    pub fn trigger(mut self, trigger: CrawlTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Rows removed by one retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeCounts {
    pub jobs: usize,
    pub crawl_logs: usize,
}

/// Read-only operations for job postings.
pub trait JobReader {
    /// Retrieve a posting, with its skills, by identifier.
    fn get_job_by_id(&self, id: JobId) -> RepositoryResult<Option<JobPosting>>;
    /// Retrieve postings, with their skills, for the given identifiers.
    fn list_jobs_by_ids(&self, ids: &[JobId]) -> RepositoryResult<Vec<JobPosting>>;
    /// PUBLISHED postings without a category, ordered by id, strictly after `after`.
    fn list_uncategorized_jobs(
        &self,
        after: Option<JobId>,
        limit: i64,
    ) -> RepositoryResult<Vec<JobPosting>>;
}

/// Write operations for job postings.
pub trait JobWriter {
    /// Insert a posting unless its `source_url` is already stored.
    ///
    /// The check and the insert are a single statement guarded by the unique
    /// constraint on `source_url`. On insert, skills are upserted with their
    /// usage counter incremented and the category usage counter is bumped,
    /// all in one transaction. Returns `None` when the posting already existed.
    fn insert_job_if_absent(
        &self,
        job: &NewJobPosting,
        skills: &[SkillName],
    ) -> RepositoryResult<Option<JobId>>;
    /// Set the category of a posting only if it still has none.
    fn set_job_category_if_missing(
        &self,
        id: JobId,
        category_id: CategoryId,
    ) -> RepositoryResult<usize>;
}

/// Read-only access to the category taxonomy.
pub trait TaxonomyReader {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
}

pub trait CrawlLogReader {
    /// List crawl logs, newest first, returning the total before pagination.
    fn list_crawl_logs(&self, query: CrawlLogListQuery)
    -> RepositoryResult<(usize, Vec<CrawlLog>)>;
}

pub trait CrawlLogWriter {
    /// Append a crawl log row.
    fn create_crawl_log(&self, log: &NewCrawlLog) -> RepositoryResult<CrawlLogId>;
}

/// Read-only operations for subscriptions.
pub trait SubscriptionReader {
    /// Active subscriptions whose owner is not banned and accepts notifications.
    fn list_active_subscriptions(&self) -> RepositoryResult<Vec<Subscription>>;
    /// All subscriptions owned by a user.
    fn list_user_subscriptions(&self, user_id: UserId) -> RepositoryResult<Vec<Subscription>>;
    /// Retrieve a subscription scoped to its owner.
    fn get_subscription_by_id(
        &self,
        id: SubscriptionId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Subscription>>;
}

/// Write operations for subscriptions, always scoped to the owner.
pub trait SubscriptionWriter {
    fn create_subscription(&self, subscription: &NewSubscription)
    -> RepositoryResult<SubscriptionId>;
    fn update_subscription(
        &self,
        id: SubscriptionId,
        subscription: &NewSubscription,
    ) -> RepositoryResult<usize>;
    fn set_subscription_active(
        &self,
        id: SubscriptionId,
        user_id: UserId,
        is_active: bool,
    ) -> RepositoryResult<usize>;
    fn delete_subscription(&self, id: SubscriptionId, user_id: UserId)
    -> RepositoryResult<usize>;
}

pub trait NotificationReader {
    /// PENDING entries due at `now` for eligible users, oldest first.
    ///
    /// Entries whose owner has no valid email address are marked FAILED
    /// instead of being returned.
    fn list_due_notifications(
        &self,
        now: NaiveDateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<DueNotification>>;
}

pub trait NotificationWriter {
    /// Insert a PENDING entry; `false` when the (user, subscription, job) row exists.
    fn enqueue_notification(&self, notification: &NewNotification) -> RepositoryResult<bool>;
    fn mark_notifications_sent(
        &self,
        ids: &[NotificationId],
        sent_at: NaiveDateTime,
    ) -> RepositoryResult<usize>;
    /// Mark entries FAILED, recording the error and incrementing `retry_count`.
    fn mark_notifications_failed(
        &self,
        ids: &[NotificationId],
        error_message: &str,
    ) -> RepositoryResult<usize>;
}

pub trait RetentionWriter {
    /// Delete postings published before `cutoff` and crawl logs created before it.
    fn purge_older_than(&self, cutoff: NaiveDateTime) -> RepositoryResult<PurgeCounts>;
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn pagination_offsets_are_one_based() {
        let first = Pagination { page: 1, per_page: 50 };
        let third = Pagination { page: 3, per_page: 50 };
        assert_eq!((first.offset(), first.limit()), (0, 50));
        assert_eq!(third.offset(), 100);
        assert_eq!(Pagination { page: 0, per_page: 50 }.offset(), 0);
    }

    #[test]
    fn huge_pages_saturate_instead_of_overflowing() {
        let page = Pagination {
            page: usize::MAX,
            per_page: 50,
        };
        assert_eq!(page.offset(), i64::MAX);
    }
}
