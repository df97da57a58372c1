//! Category backfill over PUBLISHED postings the classifier left uncategorized.

use serde::Serialize;

use crate::classifier::Classifier;
use crate::domain::types::JobId;
use crate::repository::{JobReader, JobWriter, TaxonomyReader};

use super::ServiceResult;

const BATCH_SIZE: i64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub scanned: usize,
    pub updated: usize,
}

/// Classifies every uncategorized posting again with the current taxonomy.
///
/// Only rows still missing a category are written, so re-running is safe.
pub fn backfill_categories<R>(repo: &R) -> ServiceResult<BackfillReport>
where
    R: JobReader + JobWriter + TaxonomyReader,
{
    let classifier = Classifier::load(repo)?;
    let mut report = BackfillReport::default();
    let mut after: Option<JobId> = None;

    loop {
        let batch = repo.list_uncategorized_jobs(after, BATCH_SIZE)?;
        let Some(last) = batch.last() else {
            break;
        };
        after = Some(last.id);
        report.scanned += batch.len();

        for job in &batch {
            if let Some(category_id) = classifier.classify(&job.title, &job.description) {
                report.updated += repo.set_job_category_if_missing(job.id, category_id)?;
            }
        }
        if (batch.len() as i64) < BATCH_SIZE {
            break;
        }
    }

    log::info!(
        "Category backfill scanned {} postings, categorized {}",
        report.scanned,
        report.updated
    );
    Ok(report)
}
