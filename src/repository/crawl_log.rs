use chrono::Utc;
use diesel::prelude::*;

use crate::domain::crawl_log::{CrawlLog, NewCrawlLog};
use crate::domain::types::CrawlLogId;
use crate::models::crawl_log::{CrawlLog as DbCrawlLog, NewCrawlLog as DbNewCrawlLog};
use crate::repository::{
    CrawlLogListQuery, CrawlLogReader, CrawlLogWriter, DieselRepository, RepositoryResult,
};

impl CrawlLogReader for DieselRepository {
    fn list_crawl_logs(
        &self,
        query: CrawlLogListQuery,
    ) -> RepositoryResult<(usize, Vec<CrawlLog>)> {
        use crate::schema::crawl_logs;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = crawl_logs::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(source) = query.source {
                items = items.filter(crawl_logs::source.eq(source.as_str()));
            }
            if let Some(status) = query.status {
                items = items.filter(crawl_logs::status.eq(status.as_str()));
            }
            if let Some(trigger) = query.trigger {
                items = items.filter(crawl_logs::trigger_kind.eq(trigger.as_str()));
            }
            if let Some(actor) = &query.actor {
                items = items.filter(crawl_logs::actor.eq(actor.clone()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let items = items
            .order((crawl_logs::created_at.desc(), crawl_logs::id.desc()))
            .load::<DbCrawlLog>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CrawlLog>, _>>()?;

        Ok((total, items))
    }
}

impl CrawlLogWriter for DieselRepository {
    fn create_crawl_log(&self, log: &NewCrawlLog) -> RepositoryResult<CrawlLogId> {
        use crate::schema::crawl_logs;

        let mut conn = self.conn()?;
        let row = DbNewCrawlLog::from_domain(log, Utc::now().naive_utc());

        let id: i32 = diesel::insert_into(crawl_logs::table)
            .values(&row)
            .returning(crawl_logs::id)
            .get_result(&mut conn)?;

        Ok(CrawlLogId::new(id)?)
    }
}
