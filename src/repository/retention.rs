use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::repository::{DieselRepository, PurgeCounts, RepositoryError, RepositoryResult, RetentionWriter};

impl RetentionWriter for DieselRepository {
    fn purge_older_than(&self, cutoff: NaiveDateTime) -> RepositoryResult<PurgeCounts> {
        use crate::schema::{crawl_logs, job_postings};

        let mut conn = self.conn()?;

        // Skills, bookmarks and queued notifications of a deleted posting go
        // with it through ON DELETE CASCADE.
        conn.transaction::<_, RepositoryError, _>(|conn| {
            let jobs = diesel::delete(job_postings::table.filter(job_postings::published_at.lt(cutoff)))
                .execute(conn)?;
            let crawl_logs =
                diesel::delete(crawl_logs::table.filter(crawl_logs::created_at.lt(cutoff)))
                    .execute(conn)?;
            Ok(PurgeCounts { jobs, crawl_logs })
        })
    }
}
