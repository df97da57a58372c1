use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::job::{JobPosting, NewJobPosting};
use crate::domain::types::{CategoryId, JobId, JobStatus, SkillName};
use crate::models::job::{JobPosting as DbJobPosting, NewJobPosting as DbNewJobPosting};
use crate::repository::taxonomy::{increment_category_usage, upsert_skill};
use crate::repository::{DieselRepository, JobReader, JobWriter, RepositoryError, RepositoryResult};

/// Load skill names for `rows` and convert them into domain postings.
fn with_skills(
    conn: &mut SqliteConnection,
    rows: Vec<DbJobPosting>,
) -> RepositoryResult<Vec<JobPosting>> {
    use crate::schema::{job_skills, skills};

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let pairs: Vec<(i32, String)> = job_skills::table
        .inner_join(skills::table)
        .filter(job_skills::job_id.eq_any(ids))
        .select((job_skills::job_id, skills::name))
        .order(skills::name.asc())
        .load(conn)?;

    let mut by_job: HashMap<i32, Vec<String>> = HashMap::new();
    for (job_id, name) in pairs {
        by_job.entry(job_id).or_default().push(name);
    }

    rows.into_iter()
        .map(|row| {
            let skills = by_job.remove(&row.id).unwrap_or_default();
            row.into_domain(skills).map_err(RepositoryError::from)
        })
        .collect()
}

impl JobReader for DieselRepository {
    fn get_job_by_id(&self, id: JobId) -> RepositoryResult<Option<JobPosting>> {
        use crate::schema::job_postings;

        let mut conn = self.conn()?;

        let row = job_postings::table
            .filter(job_postings::id.eq(id.get()))
            .select(DbJobPosting::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(with_skills(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn list_jobs_by_ids(&self, ids: &[JobId]) -> RepositoryResult<Vec<JobPosting>> {
        use crate::schema::job_postings;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let rows = job_postings::table
            .filter(job_postings::id.eq_any(raw_ids))
            .order(job_postings::id.asc())
            .select(DbJobPosting::as_select())
            .load(&mut conn)?;

        with_skills(&mut conn, rows)
    }

    fn list_uncategorized_jobs(
        &self,
        after: Option<JobId>,
        limit: i64,
    ) -> RepositoryResult<Vec<JobPosting>> {
        use crate::schema::job_postings;

        let mut conn = self.conn()?;

        let mut query = job_postings::table
            .select(DbJobPosting::as_select())
            .filter(job_postings::category_id.is_null())
            .filter(job_postings::status.eq(JobStatus::Published.as_str()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(after) = after {
            query = query.filter(job_postings::id.gt(after.get()));
        }

        let rows = query
            .order(job_postings::id.asc())
            .limit(limit)
            .load(&mut conn)?;

        with_skills(&mut conn, rows)
    }
}

impl JobWriter for DieselRepository {
    fn insert_job_if_absent(
        &self,
        job: &NewJobPosting,
        skills: &[SkillName],
    ) -> RepositoryResult<Option<JobId>> {
        use crate::schema::{job_postings, job_skills};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let row = DbNewJobPosting::from_domain(job, now);

            // The unique constraint on source_url is the dedup guarantee; a
            // conflicting row yields no RETURNING value.
            let inserted: Option<i32> = diesel::insert_into(job_postings::table)
                .values(&row)
                .on_conflict(job_postings::source_url)
                .do_nothing()
                .returning(job_postings::id)
                .get_result(conn)
                .optional()?;

            let Some(job_id) = inserted else {
                return Ok(None);
            };

            if let Some(category_id) = job.category_id {
                increment_category_usage(conn, category_id)?;
            }

            for skill in skills {
                let skill_id = upsert_skill(conn, skill)?;
                diesel::insert_into(job_skills::table)
                    .values((
                        job_skills::job_id.eq(job_id),
                        job_skills::skill_id.eq(skill_id.get()),
                    ))
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }

            Ok(Some(JobId::new(job_id)?))
        })
    }

    fn set_job_category_if_missing(
        &self,
        id: JobId,
        category_id: CategoryId,
    ) -> RepositoryResult<usize> {
        use crate::schema::job_postings;

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let affected = diesel::update(
                job_postings::table
                    .filter(job_postings::id.eq(id.get()))
                    .filter(job_postings::category_id.is_null()),
            )
            .set((
                job_postings::category_id.eq(Some(category_id.get())),
                job_postings::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

            if affected > 0 {
                increment_category_usage(conn, category_id)?;
            }

            Ok(affected)
        })
    }
}
